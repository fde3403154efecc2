//! Entity module - Contains all SeaORM entity definitions for the record store.
//! Each collection is a flat table keyed by a store-assigned UUID string.
//! Relationships between collections are plain id columns without foreign keys,
//! so deleting a parent never cascades.

pub mod account;
pub mod admin;
pub mod affiliate_event;
pub mod creator;
pub mod creator_sample;
pub mod revenue_entry;
pub mod sale_entry;
pub mod shop;

// Re-export specific types to avoid conflicts
pub use account::{Entity as Account, Model as AccountModel};
pub use admin::{Column as AdminColumn, Entity as Admin, Model as AdminModel};
pub use affiliate_event::{
    Column as AffiliateEventColumn, Entity as AffiliateEvent, EventStatus, EventType,
    Model as AffiliateEventModel,
};
pub use creator::{Column as CreatorColumn, ContactSource, Entity as Creator, Model as CreatorModel};
pub use creator_sample::{
    Column as CreatorSampleColumn, Entity as CreatorSample, Model as CreatorSampleModel,
};
pub use revenue_entry::{
    Column as RevenueEntryColumn, Entity as RevenueEntry, Model as RevenueEntryModel,
};
pub use sale_entry::{Column as SaleEntryColumn, Entity as SaleEntry, Model as SaleEntryModel};
pub use shop::{Column as ShopColumn, Entity as Shop, Model as ShopModel};

/// Generates a new store-assigned identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
