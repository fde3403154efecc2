//! Screens - view state for each page of the dashboard.
//!
//! A screen is mounted with a [`RecordStore`](crate::store::RecordStore) and owns
//! the subscriptions its page needs; dropping the screen detaches them. Everything a
//! page renders is derived from the latest pushed snapshots plus local form state,
//! so screens are testable without any UI. Write actions return the core
//! operation's `Result`; its `Display` is the alert shown to the user.

mod admins;
mod affiliate;
mod cascade;
mod creators;
mod dashboard;
pub mod form;
mod revenue;
mod sales;
mod samples;
mod shops;

pub use admins::{AdminDraft, AdminScreen};
pub use affiliate::{AffiliateScreen, CancelDraft, EventDraft};
pub use cascade::ShopCascade;
pub use creators::{CreatorDraft, CreatorHubScreen};
pub use dashboard::{DashboardRow, DashboardScreen};
pub use form::{DeleteConfirmation, FormState, TableState};
pub use revenue::{RevenueDraft, RevenueScreen};
pub use sales::{SaleDraft, SalesScreen};
pub use samples::{CreatorSamplesScreen, SampleDraft, SampleFilter, SampleRow};
pub use shops::{ShopDraft, ShopRow, ShopScreen};

use crate::core::UNKNOWN_NAME;
use crate::entities::{AdminModel, CreatorModel, ShopModel};
use crate::store::Subscription;

/// Records shown by name in other screens' tables and selects.
pub(crate) trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($model:ty),*) => {
        $(impl Named for $model {
            fn id(&self) -> &str {
                &self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(AdminModel, ShopModel, CreatorModel);

/// Name of the record with `id` in the latest snapshot, or `"Unknown"`.
pub(crate) fn display_name<M: Named>(records: &Subscription<M>, id: &str) -> String {
    known_name(records, id).unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Name of the record with `id`, `None` when it no longer exists.
pub(crate) fn known_name<M: Named>(records: &Subscription<M>, id: &str) -> Option<String> {
    records.with_rows(|rows| {
        rows.iter()
            .find(|record| record.id() == id)
            .map(|record| record.name().to_string())
    })
}
