//! Affiliate event entity - a scheduled promotional activity.
//!
//! Status only moves forward: `scheduled` becomes either `completed` or
//! `cancelled` (a cancellation may carry a new date, i.e. a reschedule).

use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of affiliate event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EventType {
    /// Online session
    #[sea_orm(string_value = "Webinar/Zoom")]
    Webinar,
    /// In-person seminar
    #[sea_orm(string_value = "Seminar")]
    Seminar,
    /// Informal meetup ("kopi darat")
    #[sea_orm(string_value = "Kopdar")]
    Kopdar,
    /// One-on-one session
    #[sea_orm(string_value = "Private")]
    Private,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Webinar => "Webinar/Zoom",
            Self::Seminar => "Seminar",
            Self::Kopdar => "Kopdar",
            Self::Private => "Private",
        })
    }
}

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EventStatus {
    /// Planned, not yet held
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Held
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Called off
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl EventStatus {
    /// Label shown in the status column.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Terjadwal",
            Self::Completed => "Terlaksana",
            Self::Cancelled => "Dibatalkan",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Affiliate event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "affiliate_events")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Discussion topic
    pub topic: String,
    /// Kind of event
    pub event_type: EventType,
    /// Local midnight of the event day
    pub event_date: DateTimeUtc,
    /// Current status
    pub status: EventStatus,
    /// Why the event was cancelled
    pub cancellation_reason: Option<String>,
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
