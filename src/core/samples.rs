//! Creator sample shipment business logic.
//!
//! A creator record caches the shipping details of their most recent sample so the
//! next shipment form can be pre-filled. [`save_sample`] writes the shipment and
//! refreshes that cache in one transaction. The cache only follows the creator's
//! latest shipment (by ship date, then creation time); correcting an older shipment
//! leaves the cached details alone.

use crate::{
    core::{dates, ensure_deleted, optional, required},
    entities::{ContactSource, Creator, CreatorSample, creator, creator_sample},
    errors::{Error, Result},
    store::RecordStore,
};
use chrono::{Local, NaiveDate};
use sea_orm::{
    ConnectionTrait, EntityName, QueryOrder, Select, Set, prelude::*,
};
use tracing::{debug, info, instrument};

const CREATOR_REQUIRED: &str = "Silakan pilih seorang kreator.";
const RECIPIENT_REQUIRED: &str = "Nama penerima tidak boleh kosong.";
const ADDRESS_REQUIRED: &str = "Alamat tidak boleh kosong.";
const QUANTITY_TOO_LOW: &str = "Jumlah sampel minimal 1 botol.";

/// Fields of the shipment form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFields {
    /// Creator receiving the sample
    pub creator_id: String,
    /// Name on the parcel
    pub recipient_name: String,
    /// Shipping address
    pub address: String,
    /// Courier phone number, may be blank
    pub phone_number: String,
    /// Bottles shipped
    pub quantity: i64,
    /// Ship date
    pub date_sent: NaiveDate,
}

/// Shipping defaults offered when a creator is picked in the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleAutofill {
    /// Last recipient name
    pub recipient_name: String,
    /// Last address
    pub address: String,
    /// Known phone number
    pub phone_number: String,
}

/// Pre-fill values for a new shipment to `creator`.
#[must_use]
pub fn autofill_for(creator: &creator::Model) -> SampleAutofill {
    SampleAutofill {
        recipient_name: creator.recipient_name.clone().unwrap_or_default(),
        address: creator.address.clone().unwrap_or_default(),
        phone_number: creator.phone_number.clone().unwrap_or_default(),
    }
}

/// All shipments, newest first.
#[must_use]
pub fn samples_query() -> Select<CreatorSample> {
    CreatorSample::find().order_by_desc(creator_sample::Column::CreatedAt)
}

/// Shipments of one creator, most recent first.
#[must_use]
pub fn latest_samples_query(creator_id: &str) -> Select<CreatorSample> {
    CreatorSample::find()
        .filter(creator_sample::Column::CreatorId.eq(creator_id))
        .order_by_desc(creator_sample::Column::DateSent)
        .order_by_desc(creator_sample::Column::CreatedAt)
}

/// Looks up a shipment by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_sample(
    store: &RecordStore,
    id: &str,
) -> Result<Option<creator_sample::Model>> {
    CreatorSample::find_by_id(id.to_string())
        .one(store.connection())
        .await
        .map_err(Into::into)
}

struct ValidSample {
    creator_id: String,
    recipient_name: String,
    address: String,
    phone_number: Option<String>,
    quantity: i64,
    date_sent: DateTimeUtc,
}

fn validate(fields: &SampleFields) -> Result<ValidSample> {
    let creator_id = required(&fields.creator_id, CREATOR_REQUIRED)?;
    let recipient_name = required(&fields.recipient_name, RECIPIENT_REQUIRED)?;
    let address = required(&fields.address, ADDRESS_REQUIRED)?;
    if fields.quantity < 1 {
        return Err(Error::validation(QUANTITY_TOO_LOW));
    }
    Ok(ValidSample {
        creator_id,
        recipient_name,
        address,
        phone_number: optional(Some(&fields.phone_number)),
        quantity: fields.quantity,
        date_sent: dates::to_stored(&Local, fields.date_sent)?,
    })
}

/// Creates (`existing_id = None`) or overwrites a shipment and refreshes the
/// creator's cached shipping details.
///
/// The cached recipient name and address are replaced when this shipment is the
/// creator's latest. The phone number is cached as well for TikTok creators when
/// one was given; WA creators keep their contact number. When an edit moves the
/// shipment to another creator, the previous creator's cache is re-derived from
/// their remaining shipments.
///
/// # Errors
/// Returns `Error::Validation` for bad input and `Error::NotFound` if the creator or
/// the edited shipment does not exist. Nothing is written on error.
#[instrument(skip(store, fields), fields(creator_id = %fields.creator_id))]
pub async fn save_sample(
    store: &RecordStore,
    existing_id: Option<&str>,
    fields: &SampleFields,
) -> Result<creator_sample::Model> {
    let valid = validate(fields)?;

    let txn = store.begin().await?;
    let creator = Creator::find_by_id(valid.creator_id.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("creator", valid.creator_id.clone()))?;

    let (mut model, previous_creator): (creator_sample::ActiveModel, _) = match existing_id {
        Some(id) => {
            let existing = CreatorSample::find_by_id(id.to_string())
                .one(&txn)
                .await?
                .ok_or_else(|| Error::not_found("creator sample", id))?;
            let previous = existing.creator_id.clone();
            (existing.into(), Some(previous))
        }
        None => (<creator_sample::ActiveModel as Default>::default(), None),
    };
    model.creator_id = Set(valid.creator_id);
    model.recipient_name = Set(valid.recipient_name);
    model.address = Set(valid.address);
    model.phone_number = Set(valid.phone_number);
    model.quantity = Set(valid.quantity);
    model.date_sent = Set(valid.date_sent);

    let sample = if existing_id.is_some() {
        model.update(&txn).await?
    } else {
        model.insert(&txn).await?
    };

    let latest = latest_samples_query(&creator.id).one(&txn).await?;
    if latest.is_some_and(|latest| latest.id == sample.id) {
        refresh_creator_cache(&txn, creator, &sample).await?;
    } else {
        debug!(
            "Sample {} is not the latest for creator {}, cache unchanged",
            sample.id, creator.id
        );
    }
    if let Some(previous) = previous_creator.filter(|id| *id != sample.creator_id) {
        recompute_creator_cache(&txn, &previous).await?;
    }
    txn.commit().await?;

    store.notify(CreatorSample.table_name());
    store.notify(Creator.table_name());
    info!(
        "Saved sample of {} bottles for creator {}",
        sample.quantity, sample.creator_id
    );
    Ok(sample)
}

async fn refresh_creator_cache<C: ConnectionTrait>(
    db: &C,
    creator: creator::Model,
    sample: &creator_sample::Model,
) -> Result<()> {
    let cache_phone = creator.source == ContactSource::TikTok;
    let mut model: creator::ActiveModel = creator.into();
    model.recipient_name = Set(Some(sample.recipient_name.clone()));
    model.address = Set(Some(sample.address.clone()));
    if cache_phone && let Some(phone) = &sample.phone_number {
        model.phone_number = Set(Some(phone.clone()));
    }
    model.update(db).await?;
    Ok(())
}

/// Re-derives a creator's cached details from their latest remaining shipment, or
/// clears the recipient name and address when none is left. A missing creator is
/// skipped.
async fn recompute_creator_cache<C: ConnectionTrait>(db: &C, creator_id: &str) -> Result<()> {
    let Some(creator) = Creator::find_by_id(creator_id.to_string()).one(db).await? else {
        return Ok(());
    };
    match latest_samples_query(creator_id).one(db).await? {
        Some(latest) => refresh_creator_cache(db, creator, &latest).await,
        None => {
            debug!("Creator {} has no shipments left, clearing cache", creator_id);
            let mut model: creator::ActiveModel = creator.into();
            model.recipient_name = Set(None);
            model.address = Set(None);
            model.update(db).await?;
            Ok(())
        }
    }
}

/// Deletes a shipment. The creator's cached details are not rolled back.
///
/// # Errors
/// Returns `Error::NotFound` if no shipment has this id.
pub async fn delete_sample(store: &RecordStore, id: &str) -> Result<()> {
    let rows = store.delete::<CreatorSample>(id).await?;
    ensure_deleted(rows, "creator sample", id)
}
