// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::{Address, MosaicId};
use holder_index::sqlite::SCHEMA;
use holder_index::{fee_multiplier, get_holders, AccountIndex, IndexError, SqliteAccountIndex};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use std::str::FromStr;

const MOSAIC: MosaicId = MosaicId::new(0x6BED_913F_A202_23F8);
const OTHER: MosaicId = MosaicId::new(0x0000_0000_0000_00AA);

async fn mirror() -> SqliteAccountIndex {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    let rows = [
        ("TALICE", MOSAIC, 600),
        ("TBOB", MOSAIC, 300),
        ("TCAROL", MOSAIC, 100),
        ("TDAVE", MOSAIC, 5),
        ("TSELF", MOSAIC, 1_000),
        ("TALICE", OTHER, 9_999),
    ];
    for (address, mosaic, amount) in rows {
        sqlx::query("INSERT INTO account_mosaics (address, mosaic_id, amount) VALUES (?1, ?2, ?3)")
            .bind(address)
            .bind(mosaic.to_string())
            .bind(amount as i64)
            .execute(&pool)
            .await
            .unwrap();
    }
    for (height, multiplier) in [(1, 100), (2, 2), (3, 4), (4, 6)] {
        sqlx::query("INSERT INTO blocks (height, fee_multiplier) VALUES (?1, ?2)")
            .bind(height as i64)
            .bind(multiplier as i64)
            .execute(&pool)
            .await
            .unwrap();
    }
    SqliteAccountIndex::new(pool)
}

#[tokio::test]
async fn balances_are_filtered_strictly_and_ordered() {
    let index = mirror().await;
    let balances = index.balances_above(MOSAIC, 5).await.unwrap();
    let addresses: Vec<&str> = balances.iter().map(|b| b.address.as_str()).collect();
    assert_eq!(addresses, vec!["TSELF", "TALICE", "TBOB", "TCAROL"]);
}

#[tokio::test]
async fn holders_exclude_ignored_and_renormalize() {
    let index = mirror().await;
    let ignored = vec![Address::from_str("TSELF").unwrap()];
    let holders = get_holders(&index, MOSAIC, 5, &ignored).await.unwrap();
    assert_eq!(holders.len(), 3);
    assert_eq!(holders[0].share, Decimal::new(6, 1));
    assert_eq!(holders[1].share, Decimal::new(3, 1));
    assert_eq!(holders[2].share, Decimal::new(1, 1));
}

#[tokio::test]
async fn fee_multiplier_averages_three_newest_blocks() {
    let index = mirror().await;
    assert_eq!(index.recent_fee_multipliers(3).await.unwrap(), vec![6, 4, 2]);
    assert_eq!(fee_multiplier(&index).await, Decimal::from(4));
}

#[tokio::test]
async fn missing_mirror_is_unavailable() {
    let index =
        SqliteAccountIndex::connect_lazy("sqlite:///nonexistent-dir/for/sure/mirror.db").unwrap();
    let err = get_holders(&index, MOSAIC, 0, &[]).await.unwrap_err();
    assert!(matches!(err, IndexError::Unavailable(_)));
    assert_eq!(fee_multiplier(&index).await, Decimal::ONE);
}
