use super::{DeleteConfirmation, FormState, ShopCascade, TableState};
use crate::{
    core::{
        dates,
        sales::{self, SaleFields},
    },
    entities::SaleEntryModel,
    errors::Result,
    store::{self, RecordStore, Subscription},
};
use chrono::Local;

/// Sale form values.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    /// Product sold
    pub product_name: String,
    /// Units sold
    pub quantity: i64,
    /// Price per unit
    pub unit_price: f64,
    /// `YYYY-MM-DD`
    pub entry_date: String,
}

impl Default for SaleDraft {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            quantity: 1,
            unit_price: 0.0,
            entry_date: dates::format_form_date(dates::today()),
        }
    }
}

impl SaleDraft {
    fn to_fields(&self) -> Result<SaleFields> {
        Ok(SaleFields {
            product_name: self.product_name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            entry_date: dates::parse_form_date(&self.entry_date)?,
        })
    }
}

/// Product sales data page, with the same admin → shop cascade as revenue.
#[derive(Debug)]
pub struct SalesScreen {
    store: RecordStore,
    /// Admin → shop selection
    pub cascade: ShopCascade,
    sales: Option<Subscription<SaleEntryModel>>,
    /// Create/edit modal
    pub form: FormState<SaleDraft>,
    /// Delete prompt
    pub delete: DeleteConfirmation,
}

impl SalesScreen {
    /// Mounts the page with nothing selected.
    #[must_use]
    pub fn mount(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            cascade: ShopCascade::mount(store),
            sales: None,
            form: FormState::default(),
            delete: DeleteConfirmation::default(),
        }
    }

    /// Chooses an admin, clearing the shop and its sales.
    pub fn select_admin(&mut self, admin_id: Option<&str>) {
        if self.cascade.select_admin(admin_id) {
            self.sales = None;
        }
    }

    /// Chooses a shop and subscribes to its sales.
    pub fn select_shop(&mut self, shop_id: Option<&str>) {
        if self.cascade.select_shop(shop_id) {
            self.sales = self
                .cascade
                .shop_id()
                .map(|id| self.store.subscribe(sales::sales_for_shop_query(id)));
        }
    }

    /// Sales of the selected shop, newest first. Line totals come from
    /// [`SaleEntryModel::line_total`].
    #[must_use]
    pub fn rows(&self) -> Vec<SaleEntryModel> {
        self.sales.as_ref().map(Subscription::rows).unwrap_or_default()
    }

    /// Sum of line totals of the selected shop.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.sales.as_ref().map_or(0.0, |sales| {
            sales.with_rows(|rows| rows.iter().map(SaleEntryModel::line_total).sum())
        })
    }

    /// Table area state.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if let Some(prompt) = self.cascade.prompt() {
            return prompt;
        }
        match &self.sales {
            Some(sales) if !sales.is_loading() => {
                sales.with_rows(|rows| TableState::loaded(rows.len()))
            }
            _ => TableState::Loading,
        }
    }

    /// Opens the edit form for `sale`.
    pub fn open_edit(&mut self, sale: &SaleEntryModel) {
        self.form.open_edit(
            &sale.id,
            SaleDraft {
                product_name: sale.product_name.clone(),
                quantity: sale.quantity,
                unit_price: sale.unit_price,
                entry_date: dates::stored_to_form(&Local, sale.entry_date),
            },
        );
    }

    /// Saves the open form for the selected admin and shop and closes it.
    pub async fn submit(&mut self) -> Result<()> {
        let admin_id = self.cascade.admin_id().unwrap_or_default();
        let shop_id = self.cascade.shop_id().unwrap_or_default();
        match &self.form {
            FormState::Closed => return Ok(()),
            FormState::Creating(draft) => {
                sales::create_sale(&self.store, admin_id, shop_id, &draft.to_fields()?).await?;
            }
            FormState::Editing { id, draft } => {
                sales::update_sale(&self.store, id, admin_id, shop_id, &draft.to_fields()?)
                    .await?;
            }
        }
        self.form.close();
        Ok(())
    }

    /// Deletes the sale awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        match self.delete.confirm() {
            Some(id) => sales::delete_sale(&self.store, &id).await,
            None => Ok(()),
        }
    }

    /// Waits for the next push on any live subscription.
    pub async fn next_update(&mut self) -> bool {
        tokio::select! {
            alive = self.cascade.changed() => alive,
            alive = store::changed(&mut self.sales) => alive,
        }
    }
}
