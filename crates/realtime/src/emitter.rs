//! Outbound chat messages.

use chrono::Utc;
use thiserror::Error;

use hireloop_api::models::ChatMessage;
use hireloop_session::SessionContext;

use crate::connection::{ConnectionManager, EmitOutcome};
use crate::protocol::{ClientEvent, OutgoingMessage};
use crate::store::ChatStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("sign in to send messages")]
    NotSignedIn,
}

/// Fire-and-forget sender. There is no acknowledgement and no retry.
#[derive(Clone)]
pub struct MessageEmitter {
    connection: ConnectionManager,
    session: SessionContext,
    chat: ChatStore,
}

impl MessageEmitter {
    pub fn new(connection: ConnectionManager, session: SessionContext, chat: ChatStore) -> Self {
        Self {
            connection,
            session,
            chat,
        }
    }

    /// Emit `text` into `room_id`. Handed-off messages are appended to the
    /// room right away.
    pub fn send(
        &self,
        room_id: &str,
        receiver_id: &str,
        text: &str,
    ) -> Result<EmitOutcome, SendError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        let sender_id = self.session.user_id().ok_or(SendError::NotSignedIn)?;

        let outcome = self.connection.emit(ClientEvent::SendMessage(OutgoingMessage {
            room_id: room_id.to_string(),
            sender_id: sender_id.clone(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
        }));

        if outcome == EmitOutcome::Sent {
            self.chat.append(ChatMessage {
                id: Some(cuid2::create_id()),
                room_id: room_id.to_string(),
                sender_id,
                receiver_id: receiver_id.to_string(),
                content: content.to_string(),
                timestamp: Utc::now(),
            });
        }
        Ok(outcome)
    }
}
