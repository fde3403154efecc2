//! Identity provider boundary.
//!
//! The app never talks to an authentication backend directly; it holds an
//! [`IdentityProvider`] and follows its session stream. [`LocalIdentityProvider`]
//! keeps accounts in the record store's database.

mod local;

pub use local::LocalIdentityProvider;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Account id
    pub user_id: String,
    /// Normalized email address
    pub email: String,
}

/// Rejections from the identity provider. `Display` gives the message shown on the
/// login screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No account for this email
    #[error("Pengguna tidak ditemukan. Silakan periksa kembali email Anda.")]
    UserNotFound,

    /// Password does not match
    #[error("Kata sandi salah. Silakan coba lagi.")]
    WrongPassword,

    /// Sign-up with an email that already has an account
    #[error("Email ini sudah terdaftar. Silakan masuk atau gunakan email lain.")]
    EmailAlreadyInUse,

    /// Password shorter than the provider's minimum
    #[error("Kata sandi terlalu lemah. Minimal {min_len} karakter.")]
    WeakPassword {
        /// Minimum accepted length
        min_len: usize,
    },

    /// Anything else; the code is kept for logs
    #[error("Terjadi kesalahan. Silakan coba lagi.")]
    Other {
        /// Provider error code
        code: String,
    },
}

impl AuthError {
    /// Maps a provider error code such as `auth/wrong-password`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/weak-password" => Self::WeakPassword { min_len: 6 },
            other => Self::Other {
                code: other.to_string(),
            },
        }
    }

    /// The provider error code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword { .. } => "auth/weak-password",
            Self::Other { code } => code,
        }
    }
}

/// An authentication backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Registers a new account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<()>;

    /// The signed-in user, if any.
    fn current_session(&self) -> Option<Session>;

    /// Stream of session changes; the current value is the active session.
    fn sessions(&self) -> watch::Receiver<Option<Session>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_error_codes_map_to_messages() {
        let cases = [
            (
                "auth/user-not-found",
                "Pengguna tidak ditemukan. Silakan periksa kembali email Anda.",
            ),
            ("auth/wrong-password", "Kata sandi salah. Silakan coba lagi."),
            (
                "auth/email-already-in-use",
                "Email ini sudah terdaftar. Silakan masuk atau gunakan email lain.",
            ),
            (
                "auth/weak-password",
                "Kata sandi terlalu lemah. Minimal 6 karakter.",
            ),
            ("auth/network-request-failed", "Terjadi kesalahan. Silakan coba lagi."),
        ];

        for (code, message) in cases {
            let error = AuthError::from_code(code);
            assert_eq!(error.to_string(), message);
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_auth_errors_display_through_crate_error() {
        let error: Error = AuthError::WrongPassword.into();
        assert_eq!(error.to_string(), "Kata sandi salah. Silakan coba lagi.");
    }
}
