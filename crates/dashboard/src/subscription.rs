use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use hireloop_api::models::{BillingCycle, ChangePlanRequest, PlanType, SubscriptionData};
use hireloop_api::ApiClient;
use hireloop_runtime::Scope;

use crate::error::DashboardResult;
use crate::within;

/// The caller's plan and payment history.
pub struct SubscriptionView {
    api: ApiClient,
    scope: Scope,
    state: Arc<watch::Sender<Option<SubscriptionData>>>,
}

impl SubscriptionView {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            api,
            scope: Scope::new(),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SubscriptionData>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Option<SubscriptionData> {
        self.state.borrow().clone()
    }

    pub async fn refresh(&self) -> DashboardResult<SubscriptionData> {
        let data = within(&self.scope.handle(), self.api.subscription()).await?;
        self.state.send_replace(Some(data.clone()));
        Ok(data)
    }

    pub async fn change_plan(
        &self,
        plan_type: PlanType,
        billing_cycle: BillingCycle,
    ) -> DashboardResult<SubscriptionData> {
        let request = ChangePlanRequest {
            plan_type,
            billing_cycle,
        };
        let data = within(&self.scope.handle(), self.api.change_plan(&request)).await?;
        info!(plan = ?plan_type, cycle = ?billing_cycle, "subscription plan changed");
        self.state.send_replace(Some(data.clone()));
        Ok(data)
    }

    pub async fn cancel(&self) -> DashboardResult<SubscriptionData> {
        let data = within(&self.scope.handle(), self.api.cancel_subscription()).await?;
        info!("subscription cancelled");
        self.state.send_replace(Some(data.clone()));
        Ok(data)
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
