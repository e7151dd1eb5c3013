//! State containers mutated by the dispatcher and read by views.
//!
//! Each container publishes snapshots through a `watch` channel; a view
//! re-renders when its receiver reports a change.

pub mod chat;
pub mod notices;
pub mod notifications;

pub use chat::{ChatState, ChatStore};
pub use notices::{Notice, NoticeBoard, NoticeLevel, NoticeState};
pub use notifications::{NotificationState, NotificationStore};

/// The containers owned by one client session.
#[derive(Clone, Default)]
pub struct Stores {
    pub notifications: NotificationStore,
    pub chat: ChatStore,
    pub notices: NoticeBoard,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything that belonged to the signed-in identity.
    pub fn reset_session_state(&self) {
        self.notifications.reset();
        self.chat.reset();
    }
}
