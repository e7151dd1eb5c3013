//! Channel frames.
//!
//! Every frame is a JSON text message `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use hireloop_api::models::{ChatMessage, Notification};
use hireloop_session::{Role, SessionUser};

/// Events emitted by this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "register")]
    Register(String),
    #[serde(rename = "register-admin")]
    RegisterAdmin(String),
    #[serde(rename = "join_room")]
    JoinRoom(String),
    #[serde(rename = "leave_room")]
    LeaveRoom(String),
    #[serde(rename = "send_message")]
    SendMessage(OutgoingMessage),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub room_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
}

/// Events pushed by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "force_logout")]
    ForceLogout(String),
    #[serde(rename = "broadcast")]
    Broadcast(String),
    #[serde(rename = "new_notification")]
    NewNotification(Notification),
    #[serde(rename = "notification_error")]
    NotificationError(String),
    #[serde(rename = "receive_message")]
    ReceiveMessage(ChatMessage),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ForceLogout(_) => "force_logout",
            ServerEvent::Broadcast(_) => "broadcast",
            ServerEvent::NewNotification(_) => "new_notification",
            ServerEvent::NotificationError(_) => "notification_error",
            ServerEvent::ReceiveMessage(_) => "receive_message",
        }
    }
}

/// Who a connection registers as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelIdentity {
    User(String),
    Admin(String),
}

impl ChannelIdentity {
    pub fn registration(&self) -> ClientEvent {
        match self {
            ChannelIdentity::User(id) => ClientEvent::Register(id.clone()),
            ChannelIdentity::Admin(id) => ClientEvent::RegisterAdmin(id.clone()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ChannelIdentity::User(id) | ChannelIdentity::Admin(id) => id,
        }
    }
}

impl From<&SessionUser> for ChannelIdentity {
    fn from(user: &SessionUser) -> Self {
        match user.role {
            Role::Admin => ChannelIdentity::Admin(user.id.clone()),
            Role::User | Role::Recruiter => ChannelIdentity::User(user.id.clone()),
        }
    }
}

pub fn encode(event: &ClientEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

pub fn decode(frame: &str) -> serde_json::Result<ServerEvent> {
    serde_json::from_str(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_wire_names() {
        let frames = [
            (ClientEvent::Register("u1".into()), json!({"event": "register", "data": "u1"})),
            (
                ClientEvent::RegisterAdmin("a1".into()),
                json!({"event": "register-admin", "data": "a1"}),
            ),
            (ClientEvent::JoinRoom("r1".into()), json!({"event": "join_room", "data": "r1"})),
            (ClientEvent::LeaveRoom("r1".into()), json!({"event": "leave_room", "data": "r1"})),
        ];

        for (event, expected) in frames {
            let encoded: serde_json::Value =
                serde_json::from_str(&encode(&event).unwrap()).unwrap();
            assert_eq!(encoded, expected);
        }
    }

    #[test]
    fn test_send_message_payload_is_camel_case() {
        let event = ClientEvent::SendMessage(OutgoingMessage {
            room_id: "r1".into(),
            sender_id: "u1".into(),
            receiver_id: "u2".into(),
            content: "hi".into(),
        });
        let encoded: serde_json::Value = serde_json::from_str(&encode(&event).unwrap()).unwrap();
        assert_eq!(
            encoded,
            json!({
                "event": "send_message",
                "data": {"roomId": "r1", "senderId": "u1", "receiverId": "u2", "content": "hi"}
            })
        );
    }

    #[test]
    fn test_decode_server_events() {
        let logout = decode(r#"{"event":"force_logout","data":"Account blocked"}"#).unwrap();
        assert_eq!(logout, ServerEvent::ForceLogout("Account blocked".into()));

        let notification = decode(
            r#"{"event":"new_notification","data":{"_id":"n1","message":"Ada viewed your profile","isRead":false,"createdAt":"2024-05-01T10:00:00Z"}}"#,
        )
        .unwrap();
        match notification {
            ServerEvent::NewNotification(n) => {
                assert_eq!(n.id, "n1");
                assert!(!n.is_read);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_event() {
        assert!(decode(r#"{"event":"typing","data":"u1"}"#).is_err());
    }

    #[test]
    fn test_identity_from_session_user() {
        let admin = SessionUser::new("a1", "Root", "root@example.com", Role::Admin);
        assert_eq!(
            ChannelIdentity::from(&admin).registration(),
            ClientEvent::RegisterAdmin("a1".into())
        );

        let recruiter = SessionUser::new("r1", "Grace", "grace@example.com", Role::Recruiter);
        assert_eq!(
            ChannelIdentity::from(&recruiter).registration(),
            ClientEvent::Register("r1".into())
        );
    }
}
