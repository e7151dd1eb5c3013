//! In-memory connector for tests of code built on the channel.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::connector::{ChannelLink, Connector};
use crate::error::{ChannelError, ChannelResult};
use crate::protocol::{ClientEvent, ServerEvent};

/// Hands every opened link's far end to the paired [`MemoryServer`].
pub struct MemoryConnector {
    peers: mpsc::UnboundedSender<MemoryPeer>,
    opened: AtomicUsize,
    unavailable: AtomicBool,
}

pub struct MemoryServer {
    peers: Mutex<mpsc::UnboundedReceiver<MemoryPeer>>,
}

/// Server side of one link.
pub struct MemoryPeer {
    received: mpsc::UnboundedReceiver<ClientEvent>,
    push: mpsc::UnboundedSender<ServerEvent>,
}

impl MemoryConnector {
    pub fn new() -> (Self, MemoryServer) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        (
            Self {
                peers: peers_tx,
                opened: AtomicUsize::new(0),
                unavailable: AtomicBool::new(false),
            },
            MemoryServer {
                peers: Mutex::new(peers_rx),
            },
        )
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self) -> ChannelResult<ChannelLink> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ChannelError::Unavailable("memory connector offline".into()));
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        self.opened.fetch_add(1, Ordering::SeqCst);
        let _ = self.peers.send(MemoryPeer {
            received: outbound_rx,
            push: inbound_tx,
        });

        Ok(ChannelLink::new(outbound_tx, inbound_rx, Vec::new()))
    }
}

impl MemoryServer {
    /// Next link opened by the connector.
    pub async fn accept(&self) -> Option<MemoryPeer> {
        tokio::time::timeout(Duration::from_secs(1), self.peers.lock().await.recv())
            .await
            .ok()
            .flatten()
    }
}

impl MemoryPeer {
    pub fn push(&self, event: ServerEvent) {
        let _ = self.push.send(event);
    }

    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        tokio::time::timeout(Duration::from_secs(1), self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// Everything emitted so far, without waiting.
    pub fn drain(&mut self) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.received.try_recv() {
            events.push(event);
        }
        events
    }

    /// True once the client side dropped its sender.
    pub fn is_closed(&mut self) -> bool {
        matches!(
            self.received.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        )
    }
}
