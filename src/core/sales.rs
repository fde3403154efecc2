//! Product sale entry business logic.

use crate::{
    core::{dates, ensure_deleted, non_negative, non_negative_count, required},
    entities::{SaleEntry, sale_entry},
    errors::{Error, Result},
    store::RecordStore,
};
use chrono::{Local, NaiveDate};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use tracing::info;

const SELECTION_REQUIRED: &str = "Silakan pilih admin dan toko terlebih dahulu.";
const PRODUCT_REQUIRED: &str = "Nama produk tidak boleh kosong.";

/// Editable sale entry fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleFields {
    /// Product sold
    pub product_name: String,
    /// Units sold
    pub quantity: i64,
    /// Price per unit
    pub unit_price: f64,
    /// Calendar day of the sale
    pub entry_date: NaiveDate,
}

impl SaleFields {
    fn apply(&self, model: &mut sale_entry::ActiveModel) -> Result<()> {
        model.product_name = Set(required(&self.product_name, PRODUCT_REQUIRED)?);
        model.quantity = Set(non_negative_count(self.quantity, "Jumlah terjual")?);
        model.unit_price = Set(non_negative(self.unit_price, "Harga satuan")?);
        model.entry_date = Set(dates::to_stored(&Local, self.entry_date)?);
        Ok(())
    }
}

fn selection(admin_id: &str, shop_id: &str) -> Result<(String, String)> {
    Ok((
        required(admin_id, SELECTION_REQUIRED)?,
        required(shop_id, SELECTION_REQUIRED)?,
    ))
}

/// Sales of one shop, newest first.
#[must_use]
pub fn sales_for_shop_query(shop_id: &str) -> Select<SaleEntry> {
    SaleEntry::find()
        .filter(sale_entry::Column::ShopId.eq(shop_id))
        .order_by_desc(sale_entry::Column::EntryDate)
}

/// Looks up a sale by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_sale(store: &RecordStore, id: &str) -> Result<Option<sale_entry::Model>> {
    SaleEntry::find_by_id(id.to_string())
        .one(store.connection())
        .await
        .map_err(Into::into)
}

/// Records a product sale for the selected admin and shop.
///
/// # Errors
/// Returns `Error::Validation` if the admin or shop is missing or a field is invalid.
pub async fn create_sale(
    store: &RecordStore,
    admin_id: &str,
    shop_id: &str,
    fields: &SaleFields,
) -> Result<sale_entry::Model> {
    let (admin_id, shop_id) = selection(admin_id, shop_id)?;
    let mut model = sale_entry::ActiveModel {
        admin_id: Set(admin_id),
        shop_id: Set(shop_id),
        ..Default::default()
    };
    fields.apply(&mut model)?;
    let sale = store.create(model).await?;
    info!(
        "Recorded sale of {} x '{}' in shop {}",
        sale.quantity, sale.product_name, sale.shop_id
    );
    Ok(sale)
}

/// Overwrites a sale with the form values.
///
/// # Errors
/// Returns `Error::Validation` for bad input and `Error::NotFound` if the sale is gone.
pub async fn update_sale(
    store: &RecordStore,
    id: &str,
    admin_id: &str,
    shop_id: &str,
    fields: &SaleFields,
) -> Result<sale_entry::Model> {
    let (admin_id, shop_id) = selection(admin_id, shop_id)?;
    let mut model: sale_entry::ActiveModel = get_sale(store, id)
        .await?
        .ok_or_else(|| Error::not_found("sale entry", id))?
        .into();
    model.admin_id = Set(admin_id);
    model.shop_id = Set(shop_id);
    fields.apply(&mut model)?;
    store.update(model).await
}

/// Irreversibly deletes a sale.
///
/// # Errors
/// Returns `Error::NotFound` if no sale has this id.
pub async fn delete_sale(store: &RecordStore, id: &str) -> Result<()> {
    let rows = store.delete::<SaleEntry>(id).await?;
    ensure_deleted(rows, "sale entry", id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn fields(product: &str, quantity: i64, unit_price: f64) -> SaleFields {
        SaleFields {
            product_name: product.to_string(),
            quantity,
            unit_price,
            entry_date: day(2024, 6, 1),
        }
    }

    #[tokio::test]
    async fn test_create_sale_requires_admin_and_shop() -> Result<()> {
        let store = RecordStore::new(MockDatabase::new(DatabaseBackend::Sqlite).into_connection());

        for (admin, shop) in [("", "shop"), ("admin", ""), ("", "")] {
            let result = create_sale(&store, admin, shop, &fields("Serum", 1, 10.0)).await;
            assert!(matches!(
                result.unwrap_err(),
                Error::Validation { message } if message == SELECTION_REQUIRED
            ));
        }

        let result = create_sale(&store, "admin", "shop", &fields(" ", 1, 10.0)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_sale_and_line_total() -> Result<()> {
        let (store, admin, shop) = setup_with_shop().await?;

        let sale = create_sale(&store, &admin.id, &shop.id, &fields("Serum", 3, 25_000.0)).await?;

        assert_eq!(sale.product_name, "Serum");
        assert_eq!(sale.admin_id, admin.id);
        assert_eq!(sale.line_total(), 75_000.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_sale() -> Result<()> {
        let (store, admin, shop) = setup_with_shop().await?;
        let sale = create_sale(&store, &admin.id, &shop.id, &fields("Serum", 3, 10.0)).await?;

        let updated = update_sale(&store, &sale.id, &admin.id, &shop.id, &fields("Toner", 4, 12.5)).await?;
        assert_eq!(updated.product_name, "Toner");
        assert_eq!(updated.line_total(), 50.0);

        delete_sale(&store, &sale.id).await?;
        let remaining = sales_for_shop_query(&shop.id).all(store.connection()).await?;
        assert!(remaining.is_empty());

        Ok(())
    }
}
