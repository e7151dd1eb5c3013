use hireloop_api::ApiClient;
use hireloop_realtime::store::ChatStore;
use hireloop_runtime::Scope;

use crate::error::DashboardResult;
use crate::within;

/// Loads a room's stored messages before live ones arrive over the channel.
pub struct ChatHistory {
    api: ApiClient,
    scope: Scope,
    store: ChatStore,
}

impl ChatHistory {
    pub fn new(api: ApiClient, store: ChatStore) -> Self {
        Self {
            api,
            scope: Scope::new(),
            store,
        }
    }

    pub async fn load(&self, room_id: &str) -> DashboardResult<usize> {
        let messages = within(&self.scope.handle(), self.api.chat_history(room_id)).await?;
        let count = messages.len();
        self.store.load_history(room_id, messages);
        Ok(count)
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
