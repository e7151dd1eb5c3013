use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Server id, or a client id for messages appended before the server saw them.
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub room_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    #[serde(alias = "createdAt")]
    pub timestamp: DateTime<Utc>,
}
