//! The single live channel per client.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use hireloop_session::SessionContext;

use crate::connector::{ChannelLink, Connector};
use crate::dispatcher::Dispatcher;
use crate::error::ChannelResult;
use crate::protocol::{ChannelIdentity, ClientEvent};

/// Result of handing an event to the channel. Delivery is never confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Sent,
    NotConnected,
}

struct ActiveConnection {
    identity: ChannelIdentity,
    link: ChannelLink,
}

struct Inner {
    connector: Arc<dyn Connector>,
    dispatcher: Dispatcher,
    active: Mutex<Option<ActiveConnection>>,
    connect_lock: tokio::sync::Mutex<()>,
}

/// Owns at most one connection. Clones share it.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                dispatcher,
                active: Mutex::new(None),
                connect_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveConnection>> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_connected(&self) -> bool {
        self.active()
            .as_ref()
            .is_some_and(|active| !active.link.outbound().is_closed())
    }

    pub fn identity(&self) -> Option<ChannelIdentity> {
        self.active().as_ref().map(|active| active.identity.clone())
    }

    /// Open the channel for `identity` and register it.
    ///
    /// A live connection for the same identity is reused. A connection for
    /// another identity is torn down first.
    pub async fn connect(&self, identity: ChannelIdentity) -> ChannelResult<()> {
        let _serialised = self.inner.connect_lock.lock().await;

        {
            let mut active = self.active();
            let reusable = active.as_ref().is_some_and(|current| {
                current.identity == identity && !current.link.outbound().is_closed()
            });
            if reusable {
                debug!(id = identity.id(), "channel already connected");
                return Ok(());
            }
            if let Some(previous) = active.take() {
                info!(previous = previous.identity.id(), "replacing channel connection");
            }
        }

        let mut link = self.inner.connector.open().await?;
        if link.outbound().send(identity.registration()).is_err() {
            warn!(id = identity.id(), "channel closed before registration");
        }

        if let Some(inbound) = link.take_inbound() {
            let dispatcher = self.inner.dispatcher.clone();
            link.attach(tokio::spawn(async move { dispatcher.run(inbound).await }));
        }

        info!(id = identity.id(), "channel registered");
        *self.active() = Some(ActiveConnection { identity, link });
        Ok(())
    }

    pub fn disconnect(&self) {
        if let Some(active) = self.active().take() {
            info!(id = active.identity.id(), "channel disconnected");
        }
    }

    /// Like [`disconnect`](Self::disconnect), but resolves once queued frames
    /// are flushed and the socket is closed.
    pub async fn close(&self) {
        let active = self.active().take();
        if let Some(active) = active {
            info!(id = active.identity.id(), "channel closing");
            active.link.close().await;
        }
    }

    /// Queue `event` on the live connection. Without one the call is a no-op.
    pub fn emit(&self, event: ClientEvent) -> EmitOutcome {
        let active = self.active();
        let Some(connection) = active.as_ref() else {
            debug!(?event, "no channel connection, event dropped");
            return EmitOutcome::NotConnected;
        };

        match connection.link.outbound().send(event) {
            Ok(()) => EmitOutcome::Sent,
            Err(err) => {
                warn!(event = ?err.0, "channel closed, event dropped");
                EmitOutcome::NotConnected
            }
        }
    }

    /// Follow the session: connect on sign-in, disconnect on sign-out.
    pub fn watch_session(&self, mut session: SessionContext) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut current = session.current();
            loop {
                match current.as_ref() {
                    Some(user) => {
                        if let Err(err) = manager.connect(ChannelIdentity::from(user)).await {
                            warn!(error = %err, user = %user.id, "channel connect failed");
                        }
                    }
                    None => manager.disconnect(),
                }

                match session.changed().await {
                    Some(next) => current = next,
                    None => break,
                }
            }
            manager.disconnect();
        })
    }
}
