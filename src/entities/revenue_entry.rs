//! Revenue entry entity - one day's performance record for a shop.
//!
//! `entry_date` is the user-chosen calendar day, stored as the instant of local
//! midnight. Organic sales are never stored; see [`Model::organic_sales`].

use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Revenue entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenue_entries")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Shop this entry belongs to
    pub shop_id: String,
    /// Revenue for the day
    pub revenue: f64,
    /// Total number of sales
    pub total_sales: i64,
    /// Sales attributed to paid advertising
    pub ad_sales: i64,
    /// Advertising return on investment ratio
    pub ad_roi: f64,
    /// Local midnight of the entry's calendar day
    pub entry_date: DateTimeUtc,
}

impl Model {
    /// Sales not attributed to advertising (`total_sales - ad_sales`).
    #[must_use]
    pub const fn organic_sales(&self) -> i64 {
        self.total_sales - self.ad_sales
    }
}

/// The shop link is advisory; no foreign key is declared.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.id.is_not_set() {
            self.id = Set(super::new_id());
        }
        Ok(self)
    }
}
