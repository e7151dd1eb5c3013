//! Admin user directory with debounced search.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use hireloop_api::models::AdminUserSummary;
use hireloop_api::ApiClient;
use hireloop_runtime::{Debouncer, Scope, ScopeHandle};

use crate::error::{DashboardError, DashboardResult};
use crate::within;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryState {
    pub query: String,
    pub page: u32,
    pub total_pages: u32,
    pub users: Vec<AdminUserSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct AdminUserDirectory {
    api: ApiClient,
    scope: Scope,
    debouncer: Debouncer,
    state: Arc<watch::Sender<DirectoryState>>,
}

impl AdminUserDirectory {
    pub fn new(api: ApiClient, debounce: Duration) -> Self {
        let (state, _) = watch::channel(DirectoryState {
            page: 1,
            ..DirectoryState::default()
        });
        Self {
            api,
            scope: Scope::new(),
            debouncer: Debouncer::new(debounce),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DirectoryState {
        self.state.borrow().clone()
    }

    /// Record the input immediately; the listing request waits for a quiet
    /// period and earlier pending requests are dropped.
    pub fn search(&self, text: &str) {
        let query = text.trim().to_string();
        self.state.send_modify(|state| {
            state.query = query.clone();
            state.page = 1;
        });

        let api = self.api.clone();
        let state = self.state.clone();
        let scope = self.scope.handle();
        self.debouncer.schedule(async move {
            let _ = fetch(&api, &state, &scope, query, 1).await;
        });
    }

    /// Run `text` at `page` now, dropping any search still waiting out its
    /// quiet period.
    pub async fn load(&self, text: &str, page: u32) -> DashboardResult<()> {
        self.debouncer.cancel();
        let query = text.trim().to_string();
        let page = page.max(1);
        self.state.send_modify(|state| {
            state.query = query.clone();
            state.page = page;
        });
        fetch(&self.api, &self.state, &self.scope.handle(), query, page).await
    }

    /// Load `page` of the current query right away.
    pub async fn load_page(&self, page: u32) -> DashboardResult<()> {
        let query = self.state.borrow().query.clone();
        fetch(&self.api, &self.state, &self.scope.handle(), query, page.max(1)).await
    }

    pub async fn set_blocked(
        &self,
        user_id: &str,
        blocked: bool,
    ) -> DashboardResult<AdminUserSummary> {
        let updated = within(
            &self.scope.handle(),
            self.api.set_user_blocked(user_id, blocked),
        )
        .await?;

        info!(user = %user_id, blocked, "updated user block state");
        self.state.send_modify(|state| {
            if let Some(user) = state.users.iter_mut().find(|user| user.id == updated.id) {
                *user = updated.clone();
            }
        });
        Ok(updated)
    }

    pub fn close(&self) {
        self.debouncer.cancel();
        self.scope.close();
    }
}

async fn fetch(
    api: &ApiClient,
    state: &watch::Sender<DirectoryState>,
    scope: &ScopeHandle,
    query: String,
    page: u32,
) -> DashboardResult<()> {
    if scope.is_closed() {
        return Err(DashboardError::Closed);
    }

    debug!(%query, page, "loading user directory");
    state.send_modify(|state| {
        state.loading = true;
        state.error = None;
    });

    match within(scope, api.admin_users(&query, page)).await {
        Ok(listing) => {
            state.send_modify(|state| {
                state.loading = false;
                // A newer search owns the listing now.
                if state.query != query {
                    return;
                }
                state.page = listing.page.max(page);
                state.total_pages = listing.total_pages;
                state.users = listing.items;
            });
            Ok(())
        }
        Err(DashboardError::Closed) => Err(DashboardError::Closed),
        Err(err) => {
            warn!(error = %err, %query, "user directory load failed");
            state.send_modify(|state| {
                state.loading = false;
                state.error = Some(err.to_string());
            });
            Err(err)
        }
    }
}
