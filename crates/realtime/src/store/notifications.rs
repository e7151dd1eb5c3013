use std::sync::Arc;

use tokio::sync::watch;

use hireloop_api::models::Notification;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    /// Arrival order, oldest first.
    pub items: Vec<Notification>,
    pub unread: usize,
}

#[derive(Clone)]
pub struct NotificationStore {
    state: Arc<watch::Sender<NotificationState>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        let (state, _) = watch::channel(NotificationState::default());
        Self {
            state: Arc::new(state),
        }
    }
}

impl NotificationStore {
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unread(&self) -> usize {
        self.state.borrow().unread
    }

    /// Append as delivered. Every delivery is new to the user, so it lands
    /// unread whatever the payload says. Duplicates are kept.
    pub fn append(&self, mut notification: Notification) {
        notification.is_read = false;
        self.state.send_modify(|state| {
            state.unread += 1;
            state.items.push(notification);
        });
    }

    /// Replace the sequence with a fetched history.
    pub fn replace_all(&self, items: Vec<Notification>) {
        let unread = items.iter().filter(|n| !n.is_read).count();
        self.state.send_replace(NotificationState { items, unread });
    }

    pub fn mark_read(&self, id: &str) -> bool {
        self.state.send_if_modified(|state| {
            match state.items.iter_mut().find(|n| n.id == id && !n.is_read) {
                Some(notification) => {
                    notification.is_read = true;
                    state.unread = state.unread.saturating_sub(1);
                    true
                }
                None => false,
            }
        })
    }

    pub fn mark_all_read(&self) {
        self.state.send_if_modified(|state| {
            if state.unread == 0 {
                return false;
            }
            state.items.iter_mut().for_each(|n| n.is_read = true);
            state.unread = 0;
            true
        });
    }

    /// Explicit user deletion. Returns the removed entry.
    pub fn remove(&self, id: &str) -> Option<Notification> {
        let mut removed = None;
        self.state.send_if_modified(|state| {
            let Some(index) = state.items.iter().position(|n| n.id == id) else {
                return false;
            };
            let notification = state.items.remove(index);
            if !notification.is_read {
                state.unread = state.unread.saturating_sub(1);
            }
            removed = Some(notification);
            true
        });
        removed
    }

    pub fn reset(&self) {
        self.state.send_replace(NotificationState::default());
    }
}
