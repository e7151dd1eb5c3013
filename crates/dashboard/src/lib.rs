//! # Hireloop Dashboard Crate
//!
//! View controllers for the signed-in pages. Each controller owns a
//! [`Scope`](hireloop_runtime::Scope): once it is closed (or the controller
//! dropped) in-flight responses are discarded instead of written to state.

use std::future::Future;

use hireloop_api::ApiResult;
use hireloop_runtime::ScopeHandle;

pub mod admin_users;
pub mod chat;
pub mod error;
pub mod feed;
pub mod jobs;
pub mod network;
pub mod notifications;
pub mod profile;
pub mod subscription;

pub use admin_users::{AdminUserDirectory, DirectoryState};
pub use chat::ChatHistory;
pub use error::{DashboardError, DashboardResult};
pub use feed::FeedView;
pub use jobs::{
    build_application, validate_job_post, ApplicationError, JobBoard, JobListing, JobPostError,
    RecruiterJobs, MAX_QUESTIONS,
};
pub use network::{NetworkState, NetworkView};
pub use notifications::NotificationCenter;
pub use profile::ProfileView;
pub use subscription::SubscriptionView;

/// Await an API call inside a scope.
pub(crate) async fn within<T, F>(scope: &ScopeHandle, call: F) -> DashboardResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    match scope.run(call).await {
        Some(result) => result.map_err(DashboardError::from),
        None => Err(DashboardError::Closed),
    }
}
