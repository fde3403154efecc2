//! Shared test utilities for `ShopDesk`.
//!
//! This module provides common helper functions for setting up an in-memory record
//! store and creating test records with sensible defaults.

#![allow(clippy::expect_used)]

use crate::{
    core::{admins, revenue::RevenueFields, shops},
    entities::{self, ContactSource},
    errors::Result,
    store::RecordStore,
};
use chrono::NaiveDate;
use sea_orm::Set;
use std::{future::Future, time::Duration};

/// Upper bound for any wait on a live subscription in tests.
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a record store over an in-memory `SQLite` database with all tables
/// initialized. This is the standard setup for all integration tests.
pub async fn setup_test_store() -> Result<RecordStore> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(RecordStore::new(db))
}

/// Shorthand for a calendar date.
///
/// # Panics
/// Panics on an impossible date.
#[must_use]
pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Revenue form values with ROI fixed at 2.0.
#[must_use]
pub const fn revenue_fields(
    entry_date: NaiveDate,
    revenue: f64,
    total_sales: i64,
    ad_sales: i64,
) -> RevenueFields {
    RevenueFields {
        revenue,
        total_sales,
        ad_sales,
        ad_roi: 2.0,
        entry_date,
    }
}

/// Awaits `future`, failing the test if it takes longer than [`PUSH_TIMEOUT`].
///
/// # Panics
/// Panics on timeout.
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(PUSH_TIMEOUT, future)
        .await
        .expect("timed out waiting for the record store")
}

/// Creates a test admin.
pub async fn create_test_admin(store: &RecordStore, name: &str) -> Result<entities::AdminModel> {
    admins::create_admin(store, name).await
}

/// Creates a test shop owned by `admin_id`.
pub async fn create_test_shop(
    store: &RecordStore,
    name: &str,
    admin_id: &str,
) -> Result<entities::ShopModel> {
    shops::create_shop(
        store,
        &shops::ShopFields {
            name: name.to_string(),
            admin_id: admin_id.to_string(),
        },
    )
    .await
}

/// Sets up a store with one admin owning one shop.
/// Returns (store, admin, shop) for revenue and sales tests.
pub async fn setup_with_shop() -> Result<(RecordStore, entities::AdminModel, entities::ShopModel)>
{
    let store = setup_test_store().await?;
    let admin = create_test_admin(&store, "Test Admin").await?;
    let shop = create_test_shop(&store, "Test Shop", &admin.id).await?;
    Ok((store, admin, shop))
}

/// Creates a revenue entry dated 2024-05-01.
///
/// # Defaults
/// * `ad_roi`: 2.0
pub async fn create_test_entry(
    store: &RecordStore,
    shop_id: &str,
    revenue: f64,
    total_sales: i64,
    ad_sales: i64,
) -> Result<entities::RevenueEntryModel> {
    create_test_entry_on(store, shop_id, day(2024, 5, 1), revenue, total_sales, ad_sales).await
}

/// Creates a revenue entry for a specific day.
pub async fn create_test_entry_on(
    store: &RecordStore,
    shop_id: &str,
    entry_date: NaiveDate,
    revenue: f64,
    total_sales: i64,
    ad_sales: i64,
) -> Result<entities::RevenueEntryModel> {
    crate::core::revenue::create_entry(
        store,
        shop_id,
        &revenue_fields(entry_date, revenue, total_sales, ad_sales),
    )
    .await
}

/// Creates a creator contacted on 2024-05-01, storing `phone` as given regardless
/// of the source.
pub async fn create_test_creator(
    store: &RecordStore,
    name: &str,
    source: ContactSource,
    phone: Option<&str>,
) -> Result<entities::CreatorModel> {
    let date_contacted = crate::core::dates::to_stored(&chrono::Local, day(2024, 5, 1))?;
    store
        .create(entities::creator::ActiveModel {
            name: Set(name.to_string()),
            source: Set(source),
            phone_number: Set(phone.map(ToString::to_string)),
            recipient_name: Set(None),
            address: Set(None),
            date_contacted: Set(date_contacted),
            ..Default::default()
        })
        .await
}
