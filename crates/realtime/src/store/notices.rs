use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::watch;

const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient user-visible message (banner or toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Board contents as seen by subscribers.
#[derive(Debug, Clone, Default)]
pub struct NoticeState {
    next_id: u64,
    pub notices: VecDeque<Notice>,
}

impl NoticeState {
    /// Notices newer than `after`, oldest first.
    pub fn since(&self, after: u64) -> Vec<Notice> {
        self.notices
            .iter()
            .filter(|notice| notice.id > after)
            .cloned()
            .collect()
    }
}

/// Bounded queue of notices. The oldest falls off once full.
#[derive(Clone)]
pub struct NoticeBoard {
    board: Arc<watch::Sender<NoticeState>>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        let (board, _) = watch::channel(NoticeState::default());
        Self {
            board: Arc::new(board),
        }
    }
}

impl NoticeBoard {
    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message.into())
    }

    fn push(&self, level: NoticeLevel, message: String) -> u64 {
        let mut id = 0;
        self.board.send_modify(|board| {
            board.next_id += 1;
            id = board.next_id;
            board.notices.push_back(Notice { id, level, message });
            while board.notices.len() > MAX_NOTICES {
                board.notices.pop_front();
            }
        });
        id
    }

    pub fn dismiss(&self, id: u64) -> bool {
        self.board.send_if_modified(|board| {
            let before = board.notices.len();
            board.notices.retain(|notice| notice.id != id);
            board.notices.len() != before
        })
    }

    pub fn current(&self) -> Vec<Notice> {
        self.board.borrow().notices.iter().cloned().collect()
    }

    pub fn since(&self, after: u64) -> Vec<Notice> {
        self.board.borrow().since(after)
    }

    /// Hold the receiver across waits: a push made while nobody is awaiting
    /// still marks it changed.
    pub fn subscribe(&self) -> watch::Receiver<NoticeState> {
        self.board.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let board = NoticeBoard::default();
        let first = board.info("Welcome back");
        let second = board.error("Could not load jobs");

        assert_eq!(board.current().len(), 2);
        assert!(board.dismiss(first));
        assert!(!board.dismiss(first));

        let remaining = board.current();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second);
        assert_eq!(remaining[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_board_is_bounded() {
        let board = NoticeBoard::default();
        for i in 0..(MAX_NOTICES + 5) {
            board.info(format!("notice {i}"));
        }
        let notices = board.current();
        assert_eq!(notices.len(), MAX_NOTICES);
        assert_eq!(notices[0].message, "notice 5");
    }

    #[test]
    fn test_since_filters_by_id() {
        let board = NoticeBoard::default();
        let first = board.info("a");
        board.info("b");
        let newer: Vec<_> = board.since(first).into_iter().map(|n| n.message).collect();
        assert_eq!(newer, ["b"]);
    }

    #[tokio::test]
    async fn test_held_receiver_sees_notice_pushed_between_waits() {
        let board = NoticeBoard::default();
        let mut rx = board.subscribe();

        let first = board.info("Welcome back");
        rx.changed().await.expect("board alive");
        assert_eq!(rx.borrow_and_update().since(0).len(), 1);

        board.error("Your account was blocked");
        rx.changed().await.expect("board alive");
        let pending = rx.borrow_and_update().since(first);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].level, NoticeLevel::Error);
        assert_eq!(pending[0].message, "Your account was blocked");
    }
}
