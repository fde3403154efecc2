//! Sale entry entity - a product sale line recorded against a shop and admin.

use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Sale entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_entries")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Shop the sale was made in
    pub shop_id: String,
    /// Admin responsible for the shop at the time
    pub admin_id: String,
    /// Product sold
    pub product_name: String,
    /// Units sold
    pub quantity: i64,
    /// Price per unit
    pub unit_price: f64,
    /// Local midnight of the sale's calendar day
    pub entry_date: DateTimeUtc,
}

impl Model {
    /// `quantity * unit_price`, derived at read time.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

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
