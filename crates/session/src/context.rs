//! Session writer and read-only context.
//!
//! [`Session`] owns the storage and the identity channel. It is handed to the
//! auth flows and to the realtime dispatcher (forced logout) and nowhere else.
//! Every other consumer receives a [`SessionContext`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SessionResult;
use crate::identity::SessionUser;
use crate::storage::{SessionStorage, StorageKey};

#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn SessionStorage>,
    identity: Arc<watch::Sender<Option<SessionUser>>>,
}

impl Session {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            storage,
            identity: Arc::new(identity),
        }
    }

    /// Rebuild the identity persisted by a previous run. A stored identity
    /// without its bearer token is discarded.
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let session = Self::new(storage);

        let restored = session
            .storage
            .get(StorageKey::Identity)
            .and_then(|raw| match serde_json::from_str::<SessionUser>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    warn!(%error, "discarding unreadable stored identity");
                    None
                }
            })
            .filter(|user| session.storage.contains(user.role.token_key()));

        if let Some(user) = restored {
            debug!(user = %user.id, role = ?user.role, "restored session identity");
            session.identity.send_replace(Some(user));
        }

        session
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            storage: self.storage.clone(),
            identity: self.identity.subscribe(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.identity.borrow().clone()
    }

    /// Store the bearer token under the role's key and publish the identity.
    pub fn sign_in(&self, user: SessionUser, token: &str) -> SessionResult<()> {
        self.storage.set(user.role.token_key(), token)?;
        self.storage
            .set(StorageKey::Identity, &serde_json::to_string(&user)?)?;

        info!(user = %user.id, role = ?user.role, "session started");
        self.identity.send_replace(Some(user));
        Ok(())
    }

    /// Clear tokens and identity. Returns the identity that was signed in.
    pub fn sign_out(&self) -> SessionResult<Option<SessionUser>> {
        self.storage.remove(StorageKey::AccessToken)?;
        self.storage.remove(StorageKey::AdminAccessToken)?;
        self.storage.remove(StorageKey::Identity)?;

        let previous = self.identity.send_replace(None);
        if let Some(user) = previous.as_ref() {
            info!(user = %user.id, "session ended");
        }
        Ok(previous)
    }

    pub fn store_signup_token(&self, token: &str) -> SessionResult<()> {
        self.storage.set(StorageKey::SignupToken, token)
    }

    pub fn signup_token(&self) -> Option<String> {
        self.storage.get(StorageKey::SignupToken)
    }

    pub fn clear_signup_token(&self) -> SessionResult<()> {
        self.storage.remove(StorageKey::SignupToken)
    }
}

/// Read-only view of the session.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    identity: watch::Receiver<Option<SessionUser>>,
}

impl SessionContext {
    pub fn current(&self) -> Option<SessionUser> {
        self.identity.borrow().clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.identity.borrow().as_ref().map(|user| user.id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    pub fn token(&self, key: StorageKey) -> Option<String> {
        self.storage.get(key).filter(|value| !value.is_empty())
    }

    /// Bearer token of the signed-in identity, falling back to whichever
    /// access token is stored.
    pub fn bearer_token(&self) -> Option<String> {
        match self.identity.borrow().as_ref() {
            Some(user) => self.token(user.role.token_key()),
            None => self
                .token(StorageKey::AccessToken)
                .or_else(|| self.token(StorageKey::AdminAccessToken)),
        }
    }

    pub fn storage(&self) -> &dyn SessionStorage {
        self.storage.as_ref()
    }

    /// Resolves when the identity changes. Returns `None` once the writer is gone.
    pub async fn changed(&mut self) -> Option<Option<SessionUser>> {
        self.identity.changed().await.ok()?;
        Some(self.identity.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::storage::MemoryStorage;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStorage::default()))
    }

    #[test]
    fn test_sign_in_publishes_identity_and_token() {
        let session = session();
        let context = session.context();

        session
            .sign_in(SessionUser::new("u1", "Ada", "ada@example.com", Role::User), "t1")
            .unwrap();

        assert!(context.is_authenticated());
        assert_eq!(context.user_id().as_deref(), Some("u1"));
        assert_eq!(context.bearer_token().as_deref(), Some("t1"));
        assert_eq!(context.token(StorageKey::AccessToken).as_deref(), Some("t1"));
        assert!(context.token(StorageKey::AdminAccessToken).is_none());
    }

    #[test]
    fn test_admin_sign_in_uses_admin_key() {
        let session = session();
        session
            .sign_in(SessionUser::new("a1", "Root", "root@example.com", Role::Admin), "admin")
            .unwrap();

        let context = session.context();
        assert_eq!(
            context.token(StorageKey::AdminAccessToken).as_deref(),
            Some("admin")
        );
        assert!(context.token(StorageKey::AccessToken).is_none());
    }

    #[test]
    fn test_sign_out_clears_everything_but_signup_token() {
        let session = session();
        session.store_signup_token("pending").unwrap();
        session
            .sign_in(SessionUser::new("u1", "Ada", "ada@example.com", Role::User), "t1")
            .unwrap();

        let previous = session.sign_out().unwrap();
        assert_eq!(previous.map(|user| user.id), Some("u1".to_string()));

        let context = session.context();
        assert!(!context.is_authenticated());
        assert!(context.bearer_token().is_none());
        assert_eq!(session.signup_token().as_deref(), Some("pending"));
    }

    #[test]
    fn test_restore_requires_matching_token() {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::default());
        let first = Session::new(storage.clone());
        first
            .sign_in(SessionUser::new("u1", "Ada", "ada@example.com", Role::User), "t1")
            .unwrap();

        let restored = Session::restore(storage.clone());
        assert_eq!(restored.current().map(|user| user.id), Some("u1".to_string()));

        storage.remove(StorageKey::AccessToken).unwrap();
        let orphaned = Session::restore(storage);
        assert!(orphaned.current().is_none());
    }

    #[tokio::test]
    async fn test_context_observes_changes() {
        let session = session();
        let mut context = session.context();

        session
            .sign_in(SessionUser::new("u1", "Ada", "ada@example.com", Role::User), "t1")
            .unwrap();
        let change = context.changed().await.expect("writer alive");
        assert_eq!(change.map(|user| user.id), Some("u1".to_string()));

        session.sign_out().unwrap();
        let change = context.changed().await.expect("writer alive");
        assert!(change.is_none());
    }
}
