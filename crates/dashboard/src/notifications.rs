use tracing::debug;

use hireloop_api::ApiClient;
use hireloop_realtime::store::NotificationStore;
use hireloop_runtime::Scope;

use crate::error::DashboardResult;
use crate::within;

/// Notification page. Live arrivals come from the channel dispatcher; this
/// view loads history and applies the user's own actions.
pub struct NotificationCenter {
    api: ApiClient,
    scope: Scope,
    store: NotificationStore,
}

impl NotificationCenter {
    pub fn new(api: ApiClient, store: NotificationStore) -> Self {
        Self {
            api,
            scope: Scope::new(),
            store,
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub async fn refresh(&self) -> DashboardResult<usize> {
        let history = within(&self.scope.handle(), self.api.notifications()).await?;
        let count = history.len();
        self.store.replace_all(history);
        debug!(count, "notification history loaded");
        Ok(count)
    }

    pub async fn mark_read(&self, id: &str) -> DashboardResult<()> {
        within(&self.scope.handle(), self.api.mark_notification_read(id)).await?;
        self.store.mark_read(id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DashboardResult<()> {
        within(&self.scope.handle(), self.api.delete_notification(id)).await?;
        self.store.remove(id);
        Ok(())
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
