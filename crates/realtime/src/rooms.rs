//! Room membership for a mounted chat panel.

use tracing::debug;

use crate::connection::{ConnectionManager, EmitOutcome};
use crate::protocol::ClientEvent;

/// Joined to at most one room. Dropping the membership leaves it.
pub struct RoomMembership {
    connection: ConnectionManager,
    room: Option<String>,
}

impl RoomMembership {
    /// Mount a panel on `room`, emitting the join.
    pub fn mount(connection: ConnectionManager, room: impl Into<String>) -> Self {
        let mut membership = Self {
            connection,
            room: None,
        };
        membership.enter(room);
        membership
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Switch rooms: leave the current one before joining `room`.
    pub fn enter(&mut self, room: impl Into<String>) -> EmitOutcome {
        let room = room.into();
        if self.room.as_deref() == Some(room.as_str()) {
            return EmitOutcome::Sent;
        }

        self.leave();
        debug!(%room, "joining room");
        let outcome = self.connection.emit(ClientEvent::JoinRoom(room.clone()));
        self.room = Some(room);
        outcome
    }

    pub fn leave(&mut self) {
        if let Some(room) = self.room.take() {
            debug!(%room, "leaving room");
            self.connection.emit(ClientEvent::LeaveRoom(room));
        }
    }
}

impl Drop for RoomMembership {
    fn drop(&mut self) {
        self.leave();
    }
}
