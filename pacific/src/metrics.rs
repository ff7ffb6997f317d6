// Copyright (c) James Kassemi, SC, US. All rights reserved.
//! Prometheus metrics. hyper v1.+
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{error, warn};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Counters for the API surface, kept on a private registry.
pub struct ApiMetrics {
    registry: Registry,
    requests: IntCounterVec,
    operation_sets: IntCounterVec,
    distributions: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("pacific_api_requests_total", "API requests by endpoint"),
            &["endpoint"],
        )?;
        let operation_sets = IntCounterVec::new(
            Opts::new(
                "pacific_operation_sets_total",
                "Submitted operation sets by outcome",
            ),
            &["outcome"],
        )?;
        let distributions = IntCounterVec::new(
            Opts::new("pacific_distributions_total", "Distribution runs by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(operation_sets.clone()))?;
        registry.register(Box::new(distributions.clone()))?;
        Ok(Self {
            registry,
            requests,
            operation_sets,
            distributions,
        })
    }

    pub fn inc_request(&self, endpoint: &str) {
        self.requests.with_label_values(&[endpoint]).inc();
    }

    pub fn record_operation_set(&self, confirmed: bool) {
        let outcome = if confirmed { "confirmed" } else { "failed" };
        self.operation_sets.with_label_values(&[outcome]).inc();
    }

    pub fn inc_distribution(&self, kind: &str) {
        self.distributions.with_label_values(&[kind]).inc();
    }

    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(err) = encoder.encode(&self.registry.gather(), &mut buffer) {
            error!("failed to encode metrics: {}", err);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    async fn handle(&self, req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
        let mut resp = if req.uri().path() == "/metrics" {
            Response::new(Full::new(Bytes::from(self.render())))
        } else {
            let mut resp = Response::new(Full::new(Bytes::from_static(b"not found")));
            *resp.status_mut() = StatusCode::NOT_FOUND;
            resp
        };
        resp.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("text/plain; version=0.0.4"),
        );
        Ok(resp)
    }

    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        loop {
            let (socket, _) = listener.accept().await?;
            let io = TokioIo::new(socket);
            let metrics = self.clone();
            let service = service_fn(move |req| {
                let metrics = metrics.clone();
                async move { metrics.handle(req).await }
            });
            tokio::spawn(async move {
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!("error serving metrics connection: {:?}", err);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_with_labels() {
        let metrics = ApiMetrics::new().unwrap();
        metrics.inc_request("sendDividend");
        metrics.inc_request("sendDividend");
        metrics.record_operation_set(true);
        metrics.record_operation_set(false);
        metrics.inc_distribution("dividend");

        let text = metrics.render();
        assert!(text.contains("pacific_api_requests_total{endpoint=\"sendDividend\"} 2"));
        assert!(text.contains("pacific_operation_sets_total{outcome=\"confirmed\"} 1"));
        assert!(text.contains("pacific_operation_sets_total{outcome=\"failed\"} 1"));
        assert!(text.contains("pacific_distributions_total{kind=\"dividend\"} 1"));
    }

    #[test]
    fn registries_are_independent() {
        let first = ApiMetrics::new().unwrap();
        let second = ApiMetrics::new().unwrap();
        first.inc_request("getHolders");
        assert!(!second.render().contains("getHolders"));
    }
}
