use sea_orm::{DatabaseConnection, EntityTrait, FromQueryResult, Select};
use std::sync::Arc;
use tokio::sync::{broadcast, broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Latest result set of a live query; `None` until the first query completes.
type Snapshot<M> = Option<Vec<M>>;

/// Cancellable handle to a live query.
///
/// Holds the most recent complete result set pushed by the store. Dropping the
/// handle aborts the background query task immediately, so a subscription can never
/// outlive the screen that owns it.
#[derive(Debug)]
pub struct Subscription<M> {
    rx: watch::Receiver<Snapshot<M>>,
    task: JoinHandle<()>,
}

impl<M> Subscription<M>
where
    M: FromQueryResult + Send + Sync + 'static,
{
    pub(super) fn spawn<E>(
        db: Arc<DatabaseConnection>,
        query: Select<E>,
        table: String,
        mut changes: broadcast::Receiver<String>,
    ) -> Self
    where
        E: EntityTrait<Model = M>,
        Select<E>: Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            loop {
                match query.clone().all(db.as_ref()).await {
                    Ok(rows) => {
                        debug!("Pushing {} rows from `{}`", rows.len(), table);
                        if tx.send(Some(rows)).is_err() {
                            break;
                        }
                    }
                    // Keep the previous snapshot; the next change retries.
                    Err(e) => error!("Subscription query on `{}` failed: {}", table, e),
                }
                if !wait_for_change(&tx, &mut changes, &table).await {
                    break;
                }
            }
        });
        Self { rx, task }
    }
}

impl<M> Subscription<M> {
    /// Whether the first result set is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.rx.borrow().is_none()
    }

    /// Borrows the latest snapshot. Do not hold the guard across an `.await`.
    pub fn borrow(&self) -> watch::Ref<'_, Snapshot<M>> {
        self.rx.borrow()
    }

    /// Runs `f` over the latest rows; a loading subscription reads as empty.
    pub fn with_rows<R>(&self, f: impl FnOnce(&[M]) -> R) -> R {
        f(self.rx.borrow().as_deref().unwrap_or_default())
    }

    /// Waits for the next pushed result set. Returns `false` if the query task has
    /// stopped and no further pushes will arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl<M: Clone> Subscription<M> {
    /// Clones the latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<M> {
        self.rx.borrow().clone()
    }

    /// Clones the latest rows; a loading subscription reads as empty.
    #[must_use]
    pub fn rows(&self) -> Vec<M> {
        self.with_rows(<[M]>::to_vec)
    }

    /// Waits for the first result set (returns immediately once loaded).
    pub async fn wait_for_snapshot(&mut self) -> Option<Vec<M>> {
        self.wait_until(|_| true).await
    }

    /// Waits until a pushed result set satisfies `predicate` and returns it.
    pub async fn wait_until(&mut self, mut predicate: impl FnMut(&[M]) -> bool) -> Option<Vec<M>> {
        let guard = self
            .rx
            .wait_for(|snapshot| snapshot.as_deref().is_some_and(&mut predicate))
            .await
            .ok()?;
        guard.clone()
    }
}

impl<M> Drop for Subscription<M> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Waits on an optional subscription; an absent one never fires.
pub async fn changed<M>(subscription: &mut Option<Subscription<M>>) -> bool {
    match subscription {
        Some(subscription) => subscription.changed().await,
        None => std::future::pending().await,
    }
}

/// Blocks until `table` changes. Returns `false` once nobody is listening anymore.
async fn wait_for_change<M>(
    tx: &watch::Sender<Snapshot<M>>,
    changes: &mut broadcast::Receiver<String>,
    table: &str,
) -> bool {
    loop {
        tokio::select! {
            () = tx.closed() => return false,
            notice = changes.recv() => match notice {
                Ok(changed) if changed == table => return true,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Subscription on `{}` lagged by {} notices, re-querying", table, skipped);
                    return true;
                }
                Err(RecvError::Closed) => return false,
            },
        }
    }
}
