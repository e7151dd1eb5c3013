//! Transport seam between the connection manager and the wire.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::error::ChannelResult;
use crate::protocol::{self, ClientEvent, ServerEvent};

/// How long a closing link may spend flushing queued frames and the close
/// handshake before its writer is aborted.
pub const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// An open channel: outbound queue, inbound events in delivery order, and the
/// tasks pumping them.
///
/// Dropping the link aborts the inbound tasks at once. The writer keeps
/// running until it has flushed what was already queued and closed the
/// socket, bounded by [`CLOSE_GRACE`].
pub struct ChannelLink {
    outbound: mpsc::UnboundedSender<ClientEvent>,
    inbound: Option<mpsc::UnboundedReceiver<ServerEvent>>,
    writer: Option<JoinHandle<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl ChannelLink {
    pub fn new(
        outbound: mpsc::UnboundedSender<ClientEvent>,
        inbound: mpsc::UnboundedReceiver<ServerEvent>,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            outbound,
            inbound: Some(inbound),
            writer: None,
            tasks,
        }
    }

    /// Task draining `outbound` into the socket. It must finish on its own
    /// once every sender is gone.
    pub fn with_writer(mut self, writer: JoinHandle<()>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn outbound(&self) -> &mpsc::UnboundedSender<ClientEvent> {
        &self.outbound
    }

    /// The inbound receiver can be taken once.
    pub fn take_inbound(&mut self) -> Option<mpsc::UnboundedReceiver<ServerEvent>> {
        self.inbound.take()
    }

    pub(crate) fn attach(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// Tear the link down and wait for the writer to flush and close.
    pub async fn close(mut self) {
        let writer = self.writer.take();
        drop(self);

        if let Some(mut writer) = writer {
            if tokio::time::timeout(CLOSE_GRACE, &mut writer).await.is_err() {
                warn!("channel writer did not finish closing, aborting");
                writer.abort();
            }
        }
    }
}

impl Drop for ChannelLink {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }

        // `outbound` is dropped right after this, which ends the writer loop.
        let Some(mut writer) = self.writer.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if tokio::time::timeout(CLOSE_GRACE, &mut writer).await.is_err() {
                        warn!("channel writer did not finish closing, aborting");
                        writer.abort();
                    }
                });
            }
            Err(_) => writer.abort(),
        }
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self) -> ChannelResult<ChannelLink>;
}

/// WebSocket transport speaking JSON text frames.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self) -> ChannelResult<ChannelLink> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        debug!(url = %self.url, "channel connected");

        let (mut sink, mut source) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<ServerEvent>();

        let writer = tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let frame = match protocol::encode(&event) {
                    Ok(frame) => frame,
                    Err(error) => {
                        warn!(%error, ?event, "dropping unencodable client event");
                        continue;
                    }
                };

                if let Err(error) = sink.send(Message::Text(frame)).await {
                    warn!(%error, "channel write failed, outbound events are lost");
                    break;
                }
            }
            if tokio::time::timeout(CLOSE_GRACE, sink.close()).await.is_err() {
                debug!("close handshake timed out");
            }
            debug!("channel writer finished");
        });

        let reader = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => match protocol::decode(&text) {
                        Ok(event) => {
                            if inbound_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(error) => warn!(%error, frame = %text, "skipping undecodable frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(error) => {
                        warn!(%error, "channel read failed");
                        break;
                    }
                }
            }
            debug!("channel reader finished");
        });

        Ok(ChannelLink::new(outbound_tx, inbound_rx, vec![reader]).with_writer(writer))
    }
}
