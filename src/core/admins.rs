//! Administrator business logic.

use crate::{
    core::{ensure_deleted, required},
    entities::{Admin, admin},
    errors::{Error, Result},
    store::RecordStore,
};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use tracing::info;

const NAME_REQUIRED: &str = "Nama admin tidak boleh kosong.";

/// All admins, alphabetically.
#[must_use]
pub fn admins_query() -> Select<Admin> {
    Admin::find().order_by_asc(admin::Column::Name)
}

/// Looks up an admin by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_admin(store: &RecordStore, id: &str) -> Result<Option<admin::Model>> {
    Admin::find_by_id(id.to_string())
        .one(store.connection())
        .await
        .map_err(Into::into)
}

/// Creates an admin. The name is trimmed and must not be blank.
///
/// # Errors
/// Returns `Error::Validation` for a blank name or a database error from the insert.
pub async fn create_admin(store: &RecordStore, name: &str) -> Result<admin::Model> {
    let name = required(name, NAME_REQUIRED)?;
    let admin = store
        .create(admin::ActiveModel {
            name: Set(name),
            ..Default::default()
        })
        .await?;
    info!("Created admin '{}' ({})", admin.name, admin.id);
    Ok(admin)
}

/// Renames an admin.
///
/// # Errors
/// Returns `Error::Validation` for a blank name and `Error::NotFound` if the admin is gone.
pub async fn update_admin(store: &RecordStore, id: &str, name: &str) -> Result<admin::Model> {
    let name = required(name, NAME_REQUIRED)?;
    let mut admin: admin::ActiveModel = get_admin(store, id)
        .await?
        .ok_or_else(|| Error::not_found("admin", id))?
        .into();
    admin.name = Set(name);
    store.update(admin).await
}

/// Deletes an admin. Their shops are left untouched.
///
/// # Errors
/// Returns `Error::NotFound` if no admin has this id.
pub async fn delete_admin(store: &RecordStore, id: &str) -> Result<()> {
    let rows = store.delete::<Admin>(id).await?;
    ensure_deleted(rows, "admin", id)?;
    info!("Deleted admin {}", id);
    Ok(())
}
