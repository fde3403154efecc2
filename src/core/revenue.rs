//! Shop revenue entry business logic.
//!
//! An entry records one day of a shop's performance. The entry date is chosen by
//! the user and stored as local midnight; organic sales are derived on read.

use crate::{
    core::{dates, ensure_deleted, non_negative, non_negative_count, required},
    entities::{RevenueEntry, revenue_entry},
    errors::{Error, Result},
    store::RecordStore,
};
use chrono::{Local, NaiveDate};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use tracing::info;

const SHOP_REQUIRED: &str = "Silakan pilih toko terlebih dahulu.";

/// Editable revenue entry fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueFields {
    /// Revenue for the day
    pub revenue: f64,
    /// Total number of sales
    pub total_sales: i64,
    /// Sales attributed to ads
    pub ad_sales: i64,
    /// Ad return on investment
    pub ad_roi: f64,
    /// Calendar day the entry describes
    pub entry_date: NaiveDate,
}

impl RevenueFields {
    fn validate(&self) -> Result<()> {
        non_negative(self.revenue, "Omzet")?;
        non_negative_count(self.total_sales, "Total penjualan")?;
        non_negative_count(self.ad_sales, "Penjualan iklan")?;
        non_negative(self.ad_roi, "ROI iklan")?;
        Ok(())
    }

    fn apply(&self, model: &mut revenue_entry::ActiveModel) -> Result<()> {
        model.revenue = Set(self.revenue);
        model.total_sales = Set(self.total_sales);
        model.ad_sales = Set(self.ad_sales);
        model.ad_roi = Set(self.ad_roi);
        model.entry_date = Set(dates::to_stored(&Local, self.entry_date)?);
        Ok(())
    }
}

/// Every entry, newest entry date first (dashboard input).
#[must_use]
pub fn all_entries_query() -> Select<RevenueEntry> {
    RevenueEntry::find().order_by_desc(revenue_entry::Column::EntryDate)
}

/// Entries of one shop, newest entry date first.
#[must_use]
pub fn entries_for_shop_query(shop_id: &str) -> Select<RevenueEntry> {
    RevenueEntry::find()
        .filter(revenue_entry::Column::ShopId.eq(shop_id))
        .order_by_desc(revenue_entry::Column::EntryDate)
}

/// Looks up an entry by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_entry(store: &RecordStore, id: &str) -> Result<Option<revenue_entry::Model>> {
    RevenueEntry::find_by_id(id.to_string())
        .one(store.connection())
        .await
        .map_err(Into::into)
}

/// Records a day of revenue for the selected shop.
///
/// # Errors
/// Returns `Error::Validation` if no shop is selected or an amount is negative.
pub async fn create_entry(
    store: &RecordStore,
    shop_id: &str,
    fields: &RevenueFields,
) -> Result<revenue_entry::Model> {
    let shop_id = required(shop_id, SHOP_REQUIRED)?;
    fields.validate()?;

    let mut model = revenue_entry::ActiveModel {
        shop_id: Set(shop_id),
        ..Default::default()
    };
    fields.apply(&mut model)?;
    let entry = store.create(model).await?;
    info!(
        "Recorded revenue {} for shop {} on {}",
        entry.revenue, entry.shop_id, fields.entry_date
    );
    Ok(entry)
}

/// Overwrites an entry with the form values, re-attaching it to the selected shop.
///
/// # Errors
/// Returns `Error::Validation` for bad input and `Error::NotFound` if the entry is gone.
pub async fn update_entry(
    store: &RecordStore,
    id: &str,
    shop_id: &str,
    fields: &RevenueFields,
) -> Result<revenue_entry::Model> {
    let shop_id = required(shop_id, SHOP_REQUIRED)?;
    fields.validate()?;

    let mut model: revenue_entry::ActiveModel = get_entry(store, id)
        .await?
        .ok_or_else(|| Error::not_found("revenue entry", id))?
        .into();
    model.shop_id = Set(shop_id);
    fields.apply(&mut model)?;
    store.update(model).await
}

/// Irreversibly deletes an entry.
///
/// # Errors
/// Returns `Error::NotFound` if no entry has this id.
pub async fn delete_entry(store: &RecordStore, id: &str) -> Result<()> {
    let rows = store.delete::<RevenueEntry>(id).await?;
    ensure_deleted(rows, "revenue entry", id)
}
