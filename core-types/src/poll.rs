// Copyright (c) James Kassemi, SC, US. All rights reserved.
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Fixed-interval, attempt-bounded polling for async probes.
///
/// Every attempt waits one `interval` and then runs the probe once; the sleep
/// is the only suspension point. There is no backoff tier: only the attempt
/// count bounds the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: usize,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: usize, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// 25 attempts, 2.5s apart.
    pub fn ledger_confirmation() -> Self {
        Self::new(25, Duration::from_millis(2_500))
    }

    /// Upper bound on how long [`PollPolicy::poll_until`] can suspend.
    pub fn budget(&self) -> Duration {
        self.interval
            .saturating_mul(u32::try_from(self.max_attempts).unwrap_or(u32::MAX))
    }

    /// Runs `probe` until it yields `Some`, or gives up after `max_attempts`.
    ///
    /// The probe receives the 1-based attempt number.
    pub async fn poll_until<F, Fut, T>(&self, mut probe: F) -> Option<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        for attempt in 1..=self.max_attempts {
            sleep(self.interval).await;
            if let Some(value) = probe(attempt).await {
                return Some(value);
            }
        }
        None
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::ledger_confirmation()
    }
}
