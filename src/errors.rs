//! Unified error types for `ShopDesk`.
//!
//! Every fallible operation in the crate returns [`Result`], so store, auth, and
//! validation failures can be propagated with `?` up to the screen that caused them.

use crate::auth::AuthError;
use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Record store failure (query, write, or transaction)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input rejected before any write was attempted; the message is shown to the user
    #[error("{message}")]
    Validation {
        /// User-facing explanation
        message: String,
    },

    /// A referenced record does not exist (anymore)
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record, e.g. `"creator"`
        entity: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// Affiliate event status change that is not allowed
    #[error("Cannot change event status from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// A calendar date could not be parsed or mapped to local midnight
    #[error("Invalid date: {input}")]
    InvalidDate {
        /// The rejected input
        input: String,
    },

    /// Identity provider rejection
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// I/O error (config file reading)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
