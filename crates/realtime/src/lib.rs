//! # Hireloop Realtime Crate
//!
//! The client's persistent channel to the backend.
//!
//! - **Connection**: [`ConnectionManager`] keeps one registered connection per
//!   signed-in identity and follows the session
//! - **Rooms**: [`RoomMembership`] joins a chat room while a panel is mounted
//! - **Dispatch**: [`Dispatcher`] applies server events to the [`Stores`] in
//!   delivery order
//! - **Emit**: [`MessageEmitter`] sends chat messages without acknowledgement

pub mod connection;
pub mod connector;
pub mod dispatcher;
pub mod emitter;
pub mod error;
pub mod protocol;
pub mod rooms;
pub mod store;
pub mod test_support;

pub use connection::{ConnectionManager, EmitOutcome};
pub use connector::{ChannelLink, Connector, WsConnector};
pub use dispatcher::{Dispatcher, Effect};
pub use emitter::{MessageEmitter, SendError};
pub use error::{ChannelError, ChannelResult};
pub use protocol::{ChannelIdentity, ClientEvent, OutgoingMessage, ServerEvent};
pub use rooms::RoomMembership;
pub use store::{Notice, NoticeBoard, NoticeLevel, NoticeState, Stores};
