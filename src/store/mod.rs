//! Record store - the boundary between screens and the document collections.
//!
//! [`RecordStore`] is an explicitly constructed handle that is cloned into every
//! screen and core operation; nothing in the crate reaches for a global connection.
//! Every successful write publishes the name of the touched collection on a change
//! feed, and every live [`Subscription`] re-runs its query when its own collection
//! changes, pushing the complete result set. Consumers therefore never patch lists
//! incrementally: each push replaces the previous snapshot.

mod subscription;

pub use subscription::{Subscription, changed};

use crate::errors::Result;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityName,
    EntityTrait, FromQueryResult, IntoActiveModel, PrimaryKeyTrait, Select, TransactionTrait,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, instrument, trace};

/// Number of unread change notices a subscription may fall behind by before it is
/// told it lagged (and simply re-queries).
const CHANGE_FEED_CAPACITY: usize = 64;

/// Shared handle to the record store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    db: Arc<DatabaseConnection>,
    changes: broadcast::Sender<String>,
}

impl RecordStore {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            db: Arc::new(db),
            changes,
        }
    }

    /// The underlying connection, for one-off reads.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Inserts a new record. The entity's `before_save` hook assigns the id and
    /// creation timestamp.
    pub async fn create<A>(&self, model: A) -> Result<<A::Entity as EntityTrait>::Model>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let saved = model.insert(self.db.as_ref()).await?;
        self.notify(A::Entity::default().table_name());
        Ok(saved)
    }

    /// Writes the fields that are `Set` on `model` to the record with its id.
    pub async fn update<A>(&self, model: A) -> Result<<A::Entity as EntityTrait>::Model>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let saved = model.update(self.db.as_ref()).await?;
        self.notify(A::Entity::default().table_name());
        Ok(saved)
    }

    /// Irreversibly deletes the record with `id`. Returns the number of rows removed,
    /// which is zero when the record was already gone.
    #[instrument(skip(self), fields(table = E::default().table_name()))]
    pub async fn delete<E>(&self, id: &str) -> Result<u64>
    where
        E: EntityTrait,
        E::PrimaryKey: PrimaryKeyTrait<ValueType = String>,
    {
        let result = E::delete_by_id(id.to_string()).exec(self.db.as_ref()).await?;
        self.notify(E::default().table_name());
        Ok(result.rows_affected)
    }

    /// Starts a database transaction for writes that must land together.
    /// Call [`RecordStore::notify`] for each touched collection after committing.
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        self.db.begin().await.map_err(Into::into)
    }

    /// Announces that `table` changed so its subscriptions re-query.
    pub fn notify(&self, table: &str) {
        debug!("Collection `{}` changed", table);
        if self.changes.send(table.to_string()).is_err() {
            trace!("No live subscriptions for `{}`", table);
        }
    }

    /// Number of live subscriptions listening on the change feed.
    #[must_use]
    pub fn live_subscriptions(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Opens a live query. The returned handle receives the full result set now and
    /// after every change to the queried collection; dropping it stops the query.
    pub fn subscribe<E>(&self, query: Select<E>) -> Subscription<E::Model>
    where
        E: EntityTrait,
        E::Model: FromQueryResult + Send + Sync + 'static,
        Select<E>: Send + 'static,
    {
        let table = E::default().table_name().to_string();
        // Subscribe to the feed before the first query so no write is missed.
        let changes = self.changes.subscribe();
        Subscription::spawn(Arc::clone(&self.db), query, table, changes)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{admins, creators::creators_query};
    use crate::entities::{Admin, AdminModel, admin};
    use crate::test_utils::*;
    use sea_orm::{QueryOrder, Set};
    use std::time::Duration;

    #[tokio::test]
    async fn test_subscription_pushes_full_snapshots() -> Result<()> {
        let store = setup_test_store().await?;
        let mut subscription = store.subscribe(admins::admins_query());

        let first = within(subscription.wait_for_snapshot()).await.unwrap();
        assert!(first.is_empty());
        assert!(!subscription.is_loading());

        store
            .create(admin::ActiveModel {
                name: Set("Zaki".to_string()),
                ..Default::default()
            })
            .await?;
        store
            .create(admin::ActiveModel {
                name: Set("Ayu".to_string()),
                ..Default::default()
            })
            .await?;

        let rows = within(subscription.wait_until(|rows| rows.len() == 2))
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Ayu", "Zaki"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_subscription_ignores_other_collections() -> Result<()> {
        let store = setup_test_store().await?;
        let mut creators = store.subscribe(creators_query());
        within(creators.wait_for_snapshot()).await;

        admins::create_admin(&store, "Rina").await?;

        let pushed = tokio::time::timeout(Duration::from_millis(100), creators.changed()).await;
        assert!(pushed.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_dropping_subscription_detaches() -> Result<()> {
        let store = setup_test_store().await?;
        let subscription = store.subscribe(Admin::find().order_by_asc(admin::Column::Name));
        let other: Subscription<AdminModel> = store.subscribe(admins::admins_query());
        assert_eq!(store.live_subscriptions(), 2);

        drop(subscription);
        within(async {
            while store.live_subscriptions() > 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;

        assert_eq!(store.live_subscriptions(), 1);
        drop(other);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_reports_rows_removed() -> Result<()> {
        let store = setup_test_store().await?;
        let admin = admins::create_admin(&store, "Rina").await?;

        assert_eq!(store.delete::<Admin>(&admin.id).await?, 1);
        assert_eq!(store.delete::<Admin>(&admin.id).await?, 0);
        Ok(())
    }
}
