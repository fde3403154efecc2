//! Shop business logic.
//!
//! Shops point at their admin by id only. Deleting a shop does not cascade to its
//! revenue or sale entries; those keep the dangling `shop_id`.

use crate::{
    core::{ensure_deleted, required},
    entities::{Shop, shop},
    errors::{Error, Result},
    store::RecordStore,
};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use tracing::info;

const NAME_REQUIRED: &str = "Nama toko tidak boleh kosong.";
const ADMIN_REQUIRED: &str = "Silakan pilih seorang admin.";

/// Editable shop fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShopFields {
    /// Shop name
    pub name: String,
    /// Owning admin id
    pub admin_id: String,
}

impl ShopFields {
    fn validate(&self) -> Result<(String, String)> {
        let admin_id = required(&self.admin_id, ADMIN_REQUIRED)?;
        let name = required(&self.name, NAME_REQUIRED)?;
        Ok((name, admin_id))
    }
}

/// All shops, newest first (shop management table).
#[must_use]
pub fn all_shops_query() -> Select<Shop> {
    Shop::find().order_by_desc(shop::Column::CreatedAt)
}

/// All shops, alphabetically (dashboard shop filter).
#[must_use]
pub fn shops_by_name_query() -> Select<Shop> {
    Shop::find().order_by_asc(shop::Column::Name)
}

/// Shops owned by one admin, alphabetically (cascading selects).
#[must_use]
pub fn shops_for_admin_query(admin_id: &str) -> Select<Shop> {
    Shop::find()
        .filter(shop::Column::AdminId.eq(admin_id))
        .order_by_asc(shop::Column::Name)
}

/// Looks up a shop by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_shop(store: &RecordStore, id: &str) -> Result<Option<shop::Model>> {
    Shop::find_by_id(id.to_string())
        .one(store.connection())
        .await
        .map_err(Into::into)
}

/// Creates a shop for an admin.
///
/// # Errors
/// Returns `Error::Validation` when no admin is chosen or the name is blank.
pub async fn create_shop(store: &RecordStore, fields: &ShopFields) -> Result<shop::Model> {
    let (name, admin_id) = fields.validate()?;
    let shop = store
        .create(shop::ActiveModel {
            name: Set(name),
            admin_id: Set(admin_id),
            ..Default::default()
        })
        .await?;
    info!("Created shop '{}' ({}) for admin {}", shop.name, shop.id, shop.admin_id);
    Ok(shop)
}

/// Updates a shop's name and owner.
///
/// # Errors
/// Returns `Error::Validation` for missing fields and `Error::NotFound` if the shop is gone.
pub async fn update_shop(store: &RecordStore, id: &str, fields: &ShopFields) -> Result<shop::Model> {
    let (name, admin_id) = fields.validate()?;
    let mut shop: shop::ActiveModel = get_shop(store, id)
        .await?
        .ok_or_else(|| Error::not_found("shop", id))?
        .into();
    shop.name = Set(name);
    shop.admin_id = Set(admin_id);
    store.update(shop).await
}

/// Deletes a shop. Its revenue and sale entries stay in place.
///
/// # Errors
/// Returns `Error::NotFound` if no shop has this id.
pub async fn delete_shop(store: &RecordStore, id: &str) -> Result<()> {
    let rows = store.delete::<Shop>(id).await?;
    ensure_deleted(rows, "shop", id)?;
    info!("Deleted shop {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_shop_requires_admin() -> Result<()> {
        let store = RecordStore::new(MockDatabase::new(DatabaseBackend::Sqlite).into_connection());
        let fields = ShopFields {
            name: "Toko A".to_string(),
            admin_id: String::new(),
        };

        let result = create_shop(&store, &fields).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message } if message == ADMIN_REQUIRED
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_shops_for_admin_query_filters_and_sorts() -> Result<()> {
        let store = setup_test_store().await?;
        let rina = create_test_admin(&store, "Rina").await?;
        let andi = create_test_admin(&store, "Andi").await?;
        create_test_shop(&store, "Zebra Store", &rina.id).await?;
        create_test_shop(&store, "Apel Store", &rina.id).await?;
        create_test_shop(&store, "Andi Store", &andi.id).await?;

        let shops = shops_for_admin_query(&rina.id).all(store.connection()).await?;
        let names: Vec<&str> = shops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Apel Store", "Zebra Store"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_shop_moves_to_other_admin() -> Result<()> {
        let store = setup_test_store().await?;
        let rina = create_test_admin(&store, "Rina").await?;
        let andi = create_test_admin(&store, "Andi").await?;
        let shop = create_test_shop(&store, "Toko", &rina.id).await?;

        let updated = update_shop(
            &store,
            &shop.id,
            &ShopFields {
                name: "Toko Baru".to_string(),
                admin_id: andi.id.clone(),
            },
        )
        .await?;

        assert_eq!(updated.name, "Toko Baru");
        assert_eq!(updated.admin_id, andi.id);
        assert_eq!(updated.created_at, shop.created_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_shop_does_not_cascade() -> Result<()> {
        let (store, _admin, shop) = setup_with_shop().await?;
        create_test_entry(&store, &shop.id, 100.0, 10, 4).await?;

        delete_shop(&store, &shop.id).await?;

        let entries = crate::core::revenue::entries_for_shop_query(&shop.id)
            .all(store.connection())
            .await?;
        assert_eq!(entries.len(), 1);
        assert!(get_shop(&store, &shop.id).await?.is_none());

        Ok(())
    }
}
