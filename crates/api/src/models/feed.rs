use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::network::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    #[serde(alias = "_id")]
    pub id: String,
    pub author: UserSummary,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by_me: bool,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(alias = "createdAt")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
