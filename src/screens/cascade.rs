use super::TableState;
use crate::{
    core::{admins::admins_query, shops::shops_for_admin_query},
    entities::{AdminModel, ShopModel},
    store::{self, RecordStore, Subscription},
};
use tracing::debug;

/// Cascading admin → shop selection used by the revenue and sales pages.
///
/// The shop list is subscribed only while an admin is chosen, and choosing a
/// different admin clears the shop.
#[derive(Debug)]
pub struct ShopCascade {
    store: RecordStore,
    admins: Subscription<AdminModel>,
    shops: Option<Subscription<ShopModel>>,
    admin_id: Option<String>,
    shop_id: Option<String>,
}

impl ShopCascade {
    /// Subscribes to the admin list with nothing selected.
    #[must_use]
    pub fn mount(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            admins: store.subscribe(admins_query()),
            shops: None,
            admin_id: None,
            shop_id: None,
        }
    }

    /// Admin select options.
    #[must_use]
    pub fn admins(&self) -> Vec<AdminModel> {
        self.admins.rows()
    }

    /// Shop select options; empty until an admin is chosen.
    #[must_use]
    pub fn shops(&self) -> Vec<ShopModel> {
        self.shops.as_ref().map(Subscription::rows).unwrap_or_default()
    }

    /// Chosen admin.
    #[must_use]
    pub fn admin_id(&self) -> Option<&str> {
        self.admin_id.as_deref()
    }

    /// Chosen shop.
    #[must_use]
    pub fn shop_id(&self) -> Option<&str> {
        self.shop_id.as_deref()
    }

    /// Chooses an admin (empty or `None` clears). Returns whether the selection
    /// changed; a change always clears the shop.
    pub fn select_admin(&mut self, admin_id: Option<&str>) -> bool {
        let admin_id = admin_id.filter(|id| !id.is_empty()).map(ToString::to_string);
        if admin_id == self.admin_id {
            return false;
        }
        debug!("Cascade admin changed to {:?}", admin_id);
        self.shop_id = None;
        self.shops = admin_id
            .as_deref()
            .map(|id| self.store.subscribe(shops_for_admin_query(id)));
        self.admin_id = admin_id;
        true
    }

    /// Chooses a shop (empty or `None` clears). Ignored while no admin is chosen.
    /// Returns whether the selection changed.
    pub fn select_shop(&mut self, shop_id: Option<&str>) -> bool {
        if self.admin_id.is_none() {
            return false;
        }
        let shop_id = shop_id.filter(|id| !id.is_empty()).map(ToString::to_string);
        if shop_id == self.shop_id {
            return false;
        }
        self.shop_id = shop_id;
        true
    }

    /// Prompt shown instead of the table while the selection is incomplete.
    #[must_use]
    pub const fn prompt(&self) -> Option<TableState> {
        match (&self.admin_id, &self.shop_id) {
            (None, _) => Some(TableState::SelectAdmin),
            (Some(_), None) => Some(TableState::SelectShop),
            (Some(_), Some(_)) => None,
        }
    }

    /// Waits for a new admin or shop list.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            alive = self.admins.changed() => alive,
            alive = store::changed(&mut self.shops) => alive,
        }
    }
}
