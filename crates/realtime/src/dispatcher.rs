//! Routes server events into the state containers.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use hireloop_session::{Role, Route, Session};

use crate::protocol::ServerEvent;
use crate::store::Stores;

/// Side effects the host must perform outside the containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Redirect(Route),
}

/// Holds the session writer because a forced logout must end the session.
#[derive(Clone)]
pub struct Dispatcher {
    session: Session,
    stores: Stores,
    effects: mpsc::UnboundedSender<Effect>,
}

impl Dispatcher {
    pub fn new(session: Session, stores: Stores) -> (Self, mpsc::UnboundedReceiver<Effect>) {
        let (effects, effects_rx) = mpsc::unbounded_channel();
        (
            Self {
                session,
                stores,
                effects,
            },
            effects_rx,
        )
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Drain `inbound` in delivery order until the link closes.
    pub async fn run(&self, mut inbound: mpsc::UnboundedReceiver<ServerEvent>) {
        while let Some(event) = inbound.recv().await {
            self.apply(event);
        }
        debug!("dispatcher stopped, inbound closed");
    }

    pub fn apply(&self, event: ServerEvent) {
        debug!(event = event.name(), "dispatching server event");

        match event {
            ServerEvent::ForceLogout(message) => self.force_logout(message),
            ServerEvent::Broadcast(message) => {
                self.stores.notices.info(message);
            }
            ServerEvent::NewNotification(notification) => {
                self.stores.notifications.append(notification);
            }
            ServerEvent::NotificationError(message) => {
                warn!(%message, "server reported a notification error");
                self.stores.notices.error(message);
            }
            ServerEvent::ReceiveMessage(message) => {
                self.stores.chat.append(message);
            }
        }
    }

    fn force_logout(&self, message: String) {
        let redirect = match self.session.sign_out() {
            Ok(Some(user)) if user.role == Role::Admin => Route::AdminSignIn,
            Ok(_) => Route::SignIn,
            Err(err) => {
                error!(error = %err, "failed to clear session on forced logout");
                Route::SignIn
            }
        };

        info!(%message, ?redirect, "forced logout");
        self.stores.reset_session_state();
        self.stores.notices.error(message);
        let _ = self.effects.send(Effect::Redirect(redirect));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use hireloop_api::models::{ChatMessage, Notification};
    use hireloop_session::{MemoryStorage, SessionUser, StorageKey};

    use crate::store::NoticeLevel;

    fn dispatcher() -> (Dispatcher, mpsc::UnboundedReceiver<Effect>, Session) {
        let session = Session::new(Arc::new(MemoryStorage::default()));
        let (dispatcher, effects) = Dispatcher::new(session.clone(), Stores::new());
        (dispatcher, effects, session)
    }

    fn notification(id: &str) -> Notification {
        Notification {
            id: id.to_string(),
            message: "Grace accepted your request".to_string(),
            is_read: false,
            timestamp: Utc::now(),
            sender_id: Some("u2".to_string()),
            kind: Some("connection".to_string()),
        }
    }

    #[test]
    fn test_notifications_appended_in_arrival_order() {
        let (dispatcher, _effects, _session) = dispatcher();
        for id in ["n1", "n2", "n2", "n3"] {
            dispatcher.apply(ServerEvent::NewNotification(notification(id)));
        }

        let ids: Vec<_> = dispatcher
            .stores()
            .notifications
            .snapshot()
            .items
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, ["n1", "n2", "n2", "n3"]);
        assert_eq!(dispatcher.stores().notifications.unread(), 4);
    }

    #[test]
    fn test_notification_error_only_surfaces_notice() {
        let (dispatcher, _effects, _session) = dispatcher();
        dispatcher.apply(ServerEvent::NotificationError("delivery failed".into()));

        assert!(dispatcher.stores().notifications.is_empty());
        let notices = dispatcher.stores().notices.current();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_broadcast_is_info_notice() {
        let (dispatcher, _effects, _session) = dispatcher();
        dispatcher.apply(ServerEvent::Broadcast("Maintenance at 22:00".into()));

        let notices = dispatcher.stores().notices.current();
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert_eq!(notices[0].message, "Maintenance at 22:00");
    }

    #[test]
    fn test_receive_message_appends_to_room() {
        let (dispatcher, _effects, _session) = dispatcher();
        dispatcher.apply(ServerEvent::ReceiveMessage(ChatMessage {
            id: Some("m1".into()),
            room_id: "r1".into(),
            sender_id: "u2".into(),
            receiver_id: "u1".into(),
            content: "hello".into(),
            timestamp: Utc::now(),
        }));
        assert_eq!(dispatcher.stores().chat.messages("r1").len(), 1);
    }

    #[test]
    fn test_force_logout_clears_session_and_redirects() {
        let (dispatcher, mut effects, session) = dispatcher();
        session
            .sign_in(SessionUser::new("u1", "Ada", "ada@example.com", Role::User), "t1")
            .unwrap();
        session.store_signup_token("pending").unwrap();
        dispatcher.apply(ServerEvent::NewNotification(notification("n1")));

        dispatcher.apply(ServerEvent::ForceLogout("Your account was blocked".into()));

        assert!(session.current().is_none());
        assert!(!session.storage().contains(StorageKey::AccessToken));
        assert!(dispatcher.stores().notifications.is_empty());
        assert_eq!(effects.try_recv().unwrap(), Effect::Redirect(Route::SignIn));
        assert_eq!(
            dispatcher.stores().notices.current()[0].message,
            "Your account was blocked"
        );
    }

    #[test]
    fn test_force_logout_of_admin_redirects_to_admin_sign_in() {
        let (dispatcher, mut effects, session) = dispatcher();
        session
            .sign_in(SessionUser::new("a1", "Root", "root@example.com", Role::Admin), "admin")
            .unwrap();

        dispatcher.apply(ServerEvent::ForceLogout("Session revoked".into()));

        assert!(!session.storage().contains(StorageKey::AdminAccessToken));
        assert_eq!(
            effects.try_recv().unwrap(),
            Effect::Redirect(Route::AdminSignIn)
        );
    }
}
