use super::{DeleteConfirmation, FormState, TableState, display_name};
use crate::{
    core::{
        admins::admins_query,
        shops::{self, ShopFields},
    },
    entities::{AdminModel, ShopModel},
    errors::Result,
    store::{RecordStore, Subscription},
};

/// Shop form values.
pub type ShopDraft = ShopFields;

/// A shop with its admin's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopRow {
    /// The shop
    pub shop: ShopModel,
    /// Owning admin's name, or `"Unknown"`
    pub admin_name: String,
}

/// Shop management page.
#[derive(Debug)]
pub struct ShopScreen {
    store: RecordStore,
    shops: Subscription<ShopModel>,
    admins: Subscription<AdminModel>,
    /// Create/edit modal
    pub form: FormState<ShopDraft>,
    /// Delete prompt
    pub delete: DeleteConfirmation,
}

impl ShopScreen {
    /// Mounts the page with shop and admin subscriptions.
    #[must_use]
    pub fn mount(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            shops: store.subscribe(shops::all_shops_query()),
            admins: store.subscribe(admins_query()),
            form: FormState::default(),
            delete: DeleteConfirmation::default(),
        }
    }

    /// Shops, newest first, labelled with their admin.
    #[must_use]
    pub fn rows(&self) -> Vec<ShopRow> {
        self.shops.with_rows(|shops| {
            shops
                .iter()
                .map(|shop| ShopRow {
                    admin_name: display_name(&self.admins, &shop.admin_id),
                    shop: shop.clone(),
                })
                .collect()
        })
    }

    /// Admin select options.
    #[must_use]
    pub fn admins(&self) -> Vec<AdminModel> {
        self.admins.rows()
    }

    /// A shop needs an admin, so "add shop" is disabled until one exists.
    #[must_use]
    pub fn can_create(&self) -> bool {
        self.admins.with_rows(|admins| !admins.is_empty())
    }

    /// Table area state.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if self.shops.is_loading() {
            return TableState::Loading;
        }
        self.shops.with_rows(|rows| TableState::loaded(rows.len()))
    }

    /// Opens the edit form for `shop`.
    pub fn open_edit(&mut self, shop: &ShopModel) {
        self.form.open_edit(
            &shop.id,
            ShopDraft {
                name: shop.name.clone(),
                admin_id: shop.admin_id.clone(),
            },
        );
    }

    /// Saves the open form and closes it. The form stays open on error.
    pub async fn submit(&mut self) -> Result<()> {
        match &self.form {
            FormState::Closed => return Ok(()),
            FormState::Creating(draft) => {
                shops::create_shop(&self.store, draft).await?;
            }
            FormState::Editing { id, draft } => {
                shops::update_shop(&self.store, id, draft).await?;
            }
        }
        self.form.close();
        Ok(())
    }

    /// Deletes the shop awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        match self.delete.confirm() {
            Some(id) => shops::delete_shop(&self.store, &id).await,
            None => Ok(()),
        }
    }

    /// Waits for the next push on either list.
    pub async fn next_update(&mut self) -> bool {
        tokio::select! {
            alive = self.shops.changed() => alive,
            alive = self.admins.changed() => alive,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{UNKNOWN_NAME, admins::delete_admin};
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_disabled_without_admins() -> Result<()> {
        let store = setup_test_store().await?;
        let mut screen = ShopScreen::mount(&store);
        within(screen.admins.wait_for_snapshot()).await;
        assert!(!screen.can_create());

        screen.form.open_create();
        screen.form.draft_mut().unwrap().name = "Toko A".to_string();
        let result = screen.submit().await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message } if message == "Silakan pilih seorang admin."
        ));

        create_test_admin(&store, "Rina").await?;
        within(screen.admins.wait_until(|rows| !rows.is_empty())).await;
        assert!(screen.can_create());
        Ok(())
    }

    #[tokio::test]
    async fn test_rows_show_admin_name_or_unknown() -> Result<()> {
        let (store, admin, shop) = setup_with_shop().await?;
        let mut screen = ShopScreen::mount(&store);
        within(screen.shops.wait_for_snapshot()).await;
        within(screen.admins.wait_until(|rows| !rows.is_empty())).await;

        let rows = screen.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shop.id, shop.id);
        assert_eq!(rows[0].admin_name, "Test Admin");

        delete_admin(&store, &admin.id).await?;
        within(screen.admins.wait_until(<[AdminModel]>::is_empty)).await;
        assert_eq!(screen.rows()[0].admin_name, UNKNOWN_NAME);
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_and_delete_shop() -> Result<()> {
        let (store, _admin, shop) = setup_with_shop().await?;
        let mut screen = ShopScreen::mount(&store);
        within(screen.shops.wait_for_snapshot()).await;

        screen.open_edit(&shop);
        screen.form.draft_mut().unwrap().name = "Toko Baru".to_string();
        screen.submit().await?;
        within(screen.shops.wait_until(|rows| rows[0].name == "Toko Baru")).await;

        screen.delete.request(&shop.id);
        screen.confirm_delete().await?;
        within(screen.shops.wait_until(<[ShopModel]>::is_empty)).await;
        assert_eq!(screen.table_state(), TableState::Empty);
        Ok(())
    }
}
