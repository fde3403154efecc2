//! Creator entity - a content creator being courted for affiliate promotion.
//!
//! `recipient_name`, `address`, and (for TikTok contacts) `phone_number` act as a
//! cache of the most recent sample shipment, refreshed by
//! [`crate::core::samples::save_sample`].

use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel through which a creator was first contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ContactSource {
    /// Contacted on TikTok; no phone number is kept from the contact itself
    #[sea_orm(string_value = "TikTok")]
    TikTok,
    /// Contacted on WhatsApp; the phone number is the contact handle
    #[sea_orm(string_value = "WA")]
    WhatsApp,
}

impl ContactSource {
    /// Whether the contact handle is a phone number.
    #[must_use]
    pub const fn is_phone_channel(self) -> bool {
        matches!(self, Self::WhatsApp)
    }
}

impl fmt::Display for ContactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TikTok => f.write_str("TikTok"),
            Self::WhatsApp => f.write_str("WA"),
        }
    }
}

/// Creator database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "creators")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Creator name
    pub name: String,
    /// How the creator was contacted
    pub source: ContactSource,
    /// Phone number, if known
    pub phone_number: Option<String>,
    /// Last known recipient name for samples
    pub recipient_name: Option<String>,
    /// Last known shipping address for samples
    pub address: Option<String>,
    /// Local midnight of the day the creator was first contacted
    pub date_contacted: DateTimeUtc,
    /// Stamped by the store on insert
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.id.is_not_set() {
                self.id = Set(super::new_id());
            }
            self.created_at = Set(chrono::Utc::now());
        }
        Ok(self)
    }
}
