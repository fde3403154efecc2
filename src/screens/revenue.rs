use super::{DeleteConfirmation, FormState, ShopCascade, TableState};
use crate::{
    core::{
        dates,
        revenue::{self, RevenueFields},
    },
    entities::RevenueEntryModel,
    errors::Result,
    store::{self, RecordStore, Subscription},
};
use chrono::Local;

/// Revenue form values.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueDraft {
    /// Revenue for the day
    pub revenue: f64,
    /// Total number of sales
    pub total_sales: i64,
    /// Sales attributed to ads
    pub ad_sales: i64,
    /// Ad return on investment
    pub ad_roi: f64,
    /// `YYYY-MM-DD`
    pub entry_date: String,
}

impl Default for RevenueDraft {
    fn default() -> Self {
        Self {
            revenue: 0.0,
            total_sales: 0,
            ad_sales: 0,
            ad_roi: 0.0,
            entry_date: dates::format_form_date(dates::today()),
        }
    }
}

impl RevenueDraft {
    fn from_entry(entry: &RevenueEntryModel) -> Self {
        Self {
            revenue: entry.revenue,
            total_sales: entry.total_sales,
            ad_sales: entry.ad_sales,
            ad_roi: entry.ad_roi,
            entry_date: dates::stored_to_form(&Local, entry.entry_date),
        }
    }

    fn to_fields(&self) -> Result<RevenueFields> {
        Ok(RevenueFields {
            revenue: self.revenue,
            total_sales: self.total_sales,
            ad_sales: self.ad_sales,
            ad_roi: self.ad_roi,
            entry_date: dates::parse_form_date(&self.entry_date)?,
        })
    }
}

/// Shop revenue data page.
///
/// Entries are subscribed only while a shop is selected; changing the admin or shop
/// replaces (or drops) the entry subscription.
#[derive(Debug)]
pub struct RevenueScreen {
    store: RecordStore,
    /// Admin → shop selection
    pub cascade: ShopCascade,
    entries: Option<Subscription<RevenueEntryModel>>,
    /// Create/edit modal
    pub form: FormState<RevenueDraft>,
    /// Delete prompt
    pub delete: DeleteConfirmation,
}

impl RevenueScreen {
    /// Mounts the page with nothing selected.
    #[must_use]
    pub fn mount(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            cascade: ShopCascade::mount(store),
            entries: None,
            form: FormState::default(),
            delete: DeleteConfirmation::default(),
        }
    }

    /// Chooses an admin, clearing the shop and its entries.
    pub fn select_admin(&mut self, admin_id: Option<&str>) {
        if self.cascade.select_admin(admin_id) {
            self.entries = None;
        }
    }

    /// Chooses a shop and subscribes to its entries.
    pub fn select_shop(&mut self, shop_id: Option<&str>) {
        if self.cascade.select_shop(shop_id) {
            self.entries = self
                .cascade
                .shop_id()
                .map(|id| self.store.subscribe(revenue::entries_for_shop_query(id)));
        }
    }

    /// Whether an entry subscription is live.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.entries.is_some()
    }

    /// Entries of the selected shop, newest first. Organic sales come from
    /// [`RevenueEntryModel::organic_sales`].
    #[must_use]
    pub fn rows(&self) -> Vec<RevenueEntryModel> {
        self.entries.as_ref().map(Subscription::rows).unwrap_or_default()
    }

    /// Table area state.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if let Some(prompt) = self.cascade.prompt() {
            return prompt;
        }
        match &self.entries {
            Some(entries) if !entries.is_loading() => {
                entries.with_rows(|rows| TableState::loaded(rows.len()))
            }
            _ => TableState::Loading,
        }
    }

    /// Opens the edit form for `entry`.
    pub fn open_edit(&mut self, entry: &RevenueEntryModel) {
        self.form.open_edit(&entry.id, RevenueDraft::from_entry(entry));
    }

    /// Saves the open form for the selected shop and closes it.
    pub async fn submit(&mut self) -> Result<()> {
        let shop_id = self.cascade.shop_id().unwrap_or_default();
        match &self.form {
            FormState::Closed => return Ok(()),
            FormState::Creating(draft) => {
                revenue::create_entry(&self.store, shop_id, &draft.to_fields()?).await?;
            }
            FormState::Editing { id, draft } => {
                revenue::update_entry(&self.store, id, shop_id, &draft.to_fields()?).await?;
            }
        }
        self.form.close();
        Ok(())
    }

    /// Deletes the entry awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        match self.delete.confirm() {
            Some(id) => revenue::delete_entry(&self.store, &id).await,
            None => Ok(()),
        }
    }

    /// Waits for the next push on any live subscription.
    pub async fn next_update(&mut self) -> bool {
        tokio::select! {
            alive = self.cascade.changed() => alive,
            alive = store::changed(&mut self.entries) => alive,
        }
    }
}
