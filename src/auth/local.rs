use super::{AuthError, IdentityProvider, Session};
use crate::{
    config::settings::AuthSettings,
    entities::{Account, account},
    errors::{Error, Result},
    store::RecordStore,
};
use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use tokio::sync::watch;
use tracing::{error, info, warn};

const INTERNAL_ERROR: &str = "auth/internal-error";
const INVALID_EMAIL: &str = "auth/invalid-email";

/// Identity provider backed by the `accounts` table, with argon2 password hashes.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    store: RecordStore,
    min_password_len: usize,
    session: watch::Sender<Option<Session>>,
}

impl LocalIdentityProvider {
    /// Creates a provider with nobody signed in.
    #[must_use]
    pub fn new(store: RecordStore, settings: &AuthSettings) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            store,
            min_password_len: settings.min_password_len,
            session,
        }
    }

    async fn find_account(&self, email: &str) -> Result<Option<account::Model>> {
        Account::find()
            .filter(account::Column::Email.eq(email))
            .one(self.store.connection())
            .await
            .map_err(Into::into)
    }

    fn start_session(&self, account: &account::Model) -> Session {
        let session = Session {
            user_id: account.id.clone(),
            email: account.email.clone(),
        };
        self.session.send_replace(Some(session.clone()));
        info!("Signed in as {}", session.email);
        session
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Other {
            code: INVALID_EMAIL.to_string(),
        }
        .into());
    }
    Ok(email)
}

fn internal(context: &str, e: impl std::fmt::Display) -> Error {
    error!("Password {} failed: {}", context, e);
    AuthError::Other {
        code: INTERNAL_ERROR.to_string(),
    }
    .into()
}

/// Maps a unique-index violation on `accounts.email` to `EmailAlreadyInUse`.
fn email_taken_on_conflict(e: Error) -> Error {
    match e {
        Error::Database(db)
            if matches!(db.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
        {
            AuthError::EmailAlreadyInUse.into()
        }
        other => other,
    }
}

async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| internal("hashing", e))?
    .map_err(|e| internal("hashing", e))
}

async fn verify_password(password: String, stored: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || -> std::result::Result<bool, password_hash::Error> {
        let parsed = PasswordHash::new(&stored)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    })
    .await
    .map_err(|e| internal("verification", e))?
    .map_err(|e| internal("verification", e))
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email)?;
        let Some(account) = self.find_account(&email).await? else {
            warn!("Sign-in for unknown email {}", email);
            return Err(AuthError::UserNotFound.into());
        };

        if !verify_password(password.to_string(), account.password_hash.clone()).await? {
            warn!("Wrong password for {}", email);
            return Err(AuthError::WrongPassword.into());
        }
        Ok(self.start_session(&account))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email)?;
        if password.chars().count() < self.min_password_len {
            return Err(AuthError::WeakPassword {
                min_len: self.min_password_len,
            }
            .into());
        }
        if self.find_account(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyInUse.into());
        }

        let password_hash = hash_password(password.to_string()).await?;
        let account = self
            .store
            .create(account::ActiveModel {
                email: Set(email),
                password_hash: Set(password_hash),
                ..Default::default()
            })
            .await
            .map_err(email_taken_on_conflict)?;
        info!("Registered account {}", account.email);
        Ok(self.start_session(&account))
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.session.send_replace(None) {
            info!("Signed out {}", session.email);
        }
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn sessions(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}
