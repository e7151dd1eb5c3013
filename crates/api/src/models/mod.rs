//! DTOs mirrored from the backend.
//!
//! Field names follow the backend's camelCase JSON. Ids are opaque strings and
//! accept the `_id` spelling used by document stores.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod feed;
pub mod job;
pub mod network;
pub mod notification;
pub mod subscription;
pub mod user;

pub use admin::{AdminUserSummary, BlockUserRequest};
pub use auth::{
    AuthResponse, MessageResponse, OAuthIdentity, SignInRequest, SignUpRequest, SignUpResponse,
    VerifyOtpRequest,
};
pub use chat::ChatMessage;
pub use feed::{CreatePostRequest, FeedPost};
pub use job::{
    ApplicationAnswer, ApplicationQuestion, EmploymentType, JobApplication, JobApplicationRequest,
    JobPost, JobPostRequest, JobQuery, QuestionKind, SalaryRange,
};
pub use network::{ConnectionRequest, ConnectionStatus, NewConnectionRequest, UserSummary};
pub use notification::Notification;
pub use subscription::{
    BillingCycle, ChangePlanRequest, PlanType, SubscriptionData, Transaction, TransactionStatus,
};
pub use user::{Education, Experience, UpdateProfileRequest, UserProfile};

use serde::{Deserialize, Serialize};

/// Paged listing envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}
