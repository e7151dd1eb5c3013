use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use hireloop_api::models::{UpdateProfileRequest, UserProfile};
use hireloop_api::ApiClient;
use hireloop_runtime::Scope;

use crate::error::{DashboardError, DashboardResult};
use crate::within;

pub struct ProfileView {
    api: ApiClient,
    scope: Scope,
    profile: Arc<watch::Sender<Option<UserProfile>>>,
}

impl ProfileView {
    pub fn new(api: ApiClient) -> Self {
        let (profile, _) = watch::channel(None);
        Self {
            api,
            scope: Scope::new(),
            profile: Arc::new(profile),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.profile.subscribe()
    }

    pub fn current(&self) -> Option<UserProfile> {
        self.profile.borrow().clone()
    }

    pub async fn refresh(&self) -> DashboardResult<UserProfile> {
        let profile = within(&self.scope.handle(), self.api.profile()).await?;
        self.profile.send_replace(Some(profile.clone()));
        Ok(profile)
    }

    pub async fn update(&self, changes: &UpdateProfileRequest) -> DashboardResult<UserProfile> {
        if changes.is_empty() {
            return Err(DashboardError::Invalid("Nothing to update"));
        }
        if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(DashboardError::Invalid("Name cannot be empty"));
        }

        let profile = within(&self.scope.handle(), self.api.update_profile(changes)).await?;
        info!(user = %profile.id, "profile updated");
        self.profile.send_replace(Some(profile.clone()));
        Ok(profile)
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
