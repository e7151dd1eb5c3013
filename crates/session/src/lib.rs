//! # Hireloop Session Crate
//!
//! Process-wide identity for the client: which user is signed in, where their
//! tokens live, and which routes they may see.
//!
//! - **Storage**: the `accessToken` / `adminAccessToken` / `signupToken` keys
//!   behind the [`SessionStorage`] trait (in memory or a JSON file)
//! - **Context**: [`Session`] is the only writer, [`SessionContext`] is the
//!   read handle passed to everything that needs identity
//! - **Routes**: presentation guards that redirect when a token is missing
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use hireloop_session::{MemoryStorage, Role, Session, SessionUser};
//!
//! let session = Session::new(Arc::new(MemoryStorage::default()));
//! let context = session.context();
//!
//! let user = SessionUser::new("u-1", "Ada", "ada@example.com", Role::User);
//! session.sign_in(user, "token-abc").unwrap();
//! assert_eq!(context.user_id().as_deref(), Some("u-1"));
//! ```

pub mod context;
pub mod error;
pub mod identity;
pub mod routes;
pub mod storage;

pub use context::{Session, SessionContext};
pub use error::{SessionError, SessionResult};
pub use identity::{decode_claims, Role, SessionUser, TokenClaims};
pub use routes::{gate, guard, Audience, Gate, Guarded, Route};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageKey};
