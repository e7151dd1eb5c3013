use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use hireloop_api::models::{ConnectionRequest, UserSummary};
use hireloop_api::ApiClient;
use hireloop_runtime::Scope;

use crate::error::DashboardResult;
use crate::within;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkState {
    pub connections: Vec<UserSummary>,
    /// Requests waiting for this user's answer.
    pub pending: Vec<ConnectionRequest>,
}

pub struct NetworkView {
    api: ApiClient,
    scope: Scope,
    state: Arc<watch::Sender<NetworkState>>,
}

impl NetworkView {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(NetworkState::default());
        Self {
            api,
            scope: Scope::new(),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> NetworkState {
        self.state.borrow().clone()
    }

    pub async fn refresh(&self) -> DashboardResult<()> {
        let scope = self.scope.handle();
        let (connections, pending) = tokio::try_join!(
            within(&scope, self.api.connections()),
            within(&scope, self.api.connection_requests()),
        )?;
        self.state.send_replace(NetworkState {
            connections,
            pending,
        });
        Ok(())
    }

    pub async fn send_request(&self, receiver_id: &str) -> DashboardResult<ConnectionRequest> {
        let request = within(
            &self.scope.handle(),
            self.api.send_connection_request(receiver_id),
        )
        .await?;
        info!(receiver = %receiver_id, "connection request sent");
        Ok(request)
    }

    pub async fn accept(&self, request_id: &str) -> DashboardResult<()> {
        let request = within(
            &self.scope.handle(),
            self.api.accept_connection_request(request_id),
        )
        .await?;
        self.state.send_modify(|state| {
            state.pending.retain(|pending| pending.id != request_id);
            if !state.connections.iter().any(|c| c.id == request.sender.id) {
                state.connections.push(request.sender.clone());
            }
        });
        Ok(())
    }

    pub async fn reject(&self, request_id: &str) -> DashboardResult<()> {
        within(
            &self.scope.handle(),
            self.api.reject_connection_request(request_id),
        )
        .await?;
        self.state
            .send_modify(|state| state.pending.retain(|pending| pending.id != request_id));
        Ok(())
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
