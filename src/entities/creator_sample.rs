//! Creator sample entity - a physical product sample shipped to a creator.

use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Creator sample database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "creator_samples")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Creator the sample was sent to
    pub creator_id: String,
    /// Name on the parcel
    pub recipient_name: String,
    /// Shipping address
    pub address: String,
    /// Phone number for the courier
    pub phone_number: Option<String>,
    /// Number of bottles shipped
    pub quantity: i64,
    /// Local midnight of the ship date
    pub date_sent: DateTimeUtc,
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
