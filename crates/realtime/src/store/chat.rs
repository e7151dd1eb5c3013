use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;

use hireloop_api::models::ChatMessage;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub rooms: HashMap<String, Vec<ChatMessage>>,
}

impl ChatState {
    pub fn messages(&self, room_id: &str) -> &[ChatMessage] {
        self.rooms.get(room_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Clone)]
pub struct ChatStore {
    state: Arc<watch::Sender<ChatState>>,
}

impl Default for ChatStore {
    fn default() -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self {
            state: Arc::new(state),
        }
    }
}

impl ChatStore {
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    pub fn messages(&self, room_id: &str) -> Vec<ChatMessage> {
        self.state.borrow().messages(room_id).to_vec()
    }

    /// Append to the message's room in arrival order.
    pub fn append(&self, message: ChatMessage) {
        self.state.send_modify(|state| {
            state
                .rooms
                .entry(message.room_id.clone())
                .or_default()
                .push(message);
        });
    }

    /// Replace one room's history with a fetched snapshot.
    pub fn load_history(&self, room_id: &str, messages: Vec<ChatMessage>) {
        self.state.send_modify(|state| {
            state.rooms.insert(room_id.to_string(), messages);
        });
    }

    pub fn reset(&self) {
        self.state.send_replace(ChatState::default());
    }
}
