//! Creator outreach business logic.
//!
//! New creators are added in bulk: the name field holds one name per line, and for
//! WhatsApp contacts the phone field holds one number per line in the same order.
//! The whole batch is written in a single transaction, so either every creator is
//! stored or none is.

use crate::{
    core::{dates, ensure_deleted, optional, required},
    entities::{ContactSource, Creator, creator},
    errors::{Error, Result},
    store::RecordStore,
};
use chrono::{Local, NaiveDate};
use sea_orm::{EntityName, QueryOrder, Select, Set, prelude::*};
use tracing::{debug, info, instrument};

const NAMES_REQUIRED: &str = "Silakan masukkan setidaknya satu nama kreator.";
const NAME_REQUIRED: &str = "Nama kreator tidak boleh kosong.";

/// Raw multi-line input of the "add creators" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkCreatorInput {
    /// One creator name per line
    pub names: String,
    /// One phone number per line, paired with names by position (WA only)
    pub phones: String,
    /// Contact channel shared by the whole batch
    pub source: ContactSource,
    /// Day the batch was contacted
    pub date_contacted: NaiveDate,
}

/// One creator of a bulk batch, after splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCreator {
    /// Trimmed name
    pub name: String,
    /// Paired phone number, if any
    pub phone_number: Option<String>,
}

/// Splits bulk input into individual creators.
///
/// Names are trimmed and blank lines dropped. Phone lines are trimmed but kept in
/// place, so the Nth remaining name gets the Nth phone line; names without a phone
/// line get none. Phones are ignored unless the source is the phone channel.
///
/// # Errors
/// Returns `Error::Validation` if no name remains.
pub fn plan_bulk(input: &BulkCreatorInput) -> Result<Vec<PlannedCreator>> {
    let phones: Vec<&str> = if input.source.is_phone_channel() {
        input.phones.lines().map(str::trim).collect()
    } else {
        Vec::new()
    };

    let planned: Vec<PlannedCreator> = input
        .names
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .enumerate()
        .map(|(index, name)| PlannedCreator {
            name: name.to_string(),
            phone_number: optional(phones.get(index).copied()),
        })
        .collect();

    if planned.is_empty() {
        return Err(Error::validation(NAMES_REQUIRED));
    }
    Ok(planned)
}

/// Fields of the single-creator edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorFields {
    /// Creator name
    pub name: String,
    /// Contact channel
    pub source: ContactSource,
    /// Phone number (only stored for WA contacts)
    pub phone_number: String,
    /// Day first contacted
    pub date_contacted: NaiveDate,
}

/// All creators, newest first.
#[must_use]
pub fn creators_query() -> Select<Creator> {
    Creator::find().order_by_desc(creator::Column::CreatedAt)
}

/// All creators, alphabetically (pickers and filters).
#[must_use]
pub fn creators_by_name_query() -> Select<Creator> {
    Creator::find().order_by_asc(creator::Column::Name)
}

/// Looks up a creator by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_creator(store: &RecordStore, id: &str) -> Result<Option<creator::Model>> {
    Creator::find_by_id(id.to_string())
        .one(store.connection())
        .await
        .map_err(Into::into)
}

/// Creates one creator per name line, atomically.
///
/// # Errors
/// Returns `Error::Validation` if no name was given; any database error rolls back
/// the whole batch.
#[instrument(skip_all, fields(source = %input.source))]
pub async fn create_creators_bulk(
    store: &RecordStore,
    input: &BulkCreatorInput,
) -> Result<Vec<creator::Model>> {
    let planned = plan_bulk(input)?;
    let date_contacted = dates::to_stored(&Local, input.date_contacted)?;

    let txn = store.begin().await?;
    let mut created = Vec::with_capacity(planned.len());
    for creator in planned {
        let model = creator::ActiveModel {
            name: Set(creator.name),
            source: Set(input.source),
            phone_number: Set(creator.phone_number),
            recipient_name: Set(None),
            address: Set(None),
            date_contacted: Set(date_contacted),
            ..Default::default()
        };
        // Dropping `txn` on error rolls the batch back.
        created.push(model.insert(&txn).await?);
    }
    txn.commit().await?;
    store.notify(Creator.table_name());

    info!("Added {} creators via {}", created.len(), input.source);
    Ok(created)
}

/// Updates a single creator.
///
/// The phone number is stored for WA contacts; for TikTok contacts the form has no
/// phone field, so the stored number (possibly cached from a sample) is kept.
///
/// # Errors
/// Returns `Error::Validation` for a blank name and `Error::NotFound` if the creator is gone.
pub async fn update_creator(
    store: &RecordStore,
    id: &str,
    fields: &CreatorFields,
) -> Result<creator::Model> {
    let name = required(&fields.name, NAME_REQUIRED)?;
    let mut model: creator::ActiveModel = get_creator(store, id)
        .await?
        .ok_or_else(|| Error::not_found("creator", id))?
        .into();

    model.name = Set(name);
    model.source = Set(fields.source);
    model.date_contacted = Set(dates::to_stored(&Local, fields.date_contacted)?);
    if fields.source.is_phone_channel() {
        model.phone_number = Set(optional(Some(&fields.phone_number)));
    } else {
        debug!("Keeping stored phone number of TikTok creator {}", id);
    }
    store.update(model).await
}

/// Deletes a creator. Their samples are kept.
///
/// # Errors
/// Returns `Error::NotFound` if no creator has this id.
pub async fn delete_creator(store: &RecordStore, id: &str) -> Result<()> {
    let rows = store.delete::<Creator>(id).await?;
    ensure_deleted(rows, "creator", id)
}
