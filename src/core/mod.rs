//! Core business logic - framework-agnostic operations over the record store.
//!
//! Each module owns one collection: the queries its screens subscribe to and the
//! create / update / delete operations with their shallow validation. Screens call
//! these functions; nothing here knows about forms or rendering.

pub mod admins;
pub mod creators;
pub mod dates;
pub mod events;
pub mod report;
pub mod revenue;
pub mod sales;
pub mod samples;
pub mod shops;

use crate::errors::{Error, Result};

/// Placeholder shown when a referenced record no longer exists.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Trims `value` and rejects it with `message` when nothing is left.
pub(crate) fn required(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(message));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field, mapping blank input to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Rejects negative or non-finite amounts.
pub(crate) fn non_negative(value: f64, field: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{field} harus berupa angka positif."
        )));
    }
    Ok(value)
}

/// Rejects negative counts.
pub(crate) fn non_negative_count(value: i64, field: &str) -> Result<i64> {
    if value < 0 {
        return Err(Error::validation(format!(
            "{field} tidak boleh negatif."
        )));
    }
    Ok(value)
}

/// Turns a zero-row delete into `Error::NotFound`.
pub(crate) fn ensure_deleted(rows: u64, entity: &'static str, id: &str) -> Result<()> {
    if rows == 0 {
        return Err(Error::not_found(entity, id));
    }
    Ok(())
}
