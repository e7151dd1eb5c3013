//! # Hireloop Auth Crate
//!
//! The client's authentication flows. Each flow validates its form locally,
//! talks to the backend through [`hireloop_api::ApiClient`] and writes the
//! result into the [`hireloop_session::Session`].
//!
//! - [`SignInFlow`] for the user and admin portals
//! - [`SignUpFlow`] storing the interim sign-up token
//! - [`OtpFlow`] with the six-cell [`OtpInput`] and the [`ResendCooldown`]
//! - [`GoogleOAuth`] for third-party sign-in

pub mod error;
pub mod flow;
pub mod oauth;
pub mod otp;
pub mod sign_in;
pub mod sign_up;
pub mod validation;

pub use error::{user_message, AuthError, AuthResult};
pub use flow::FlowState;
pub use oauth::{complete_oauth_sign_in, GoogleOAuth, PendingAuthorization, ProviderEndpoints};
pub use otp::{OtpFlow, OtpInput, ResendCooldown, ResendOutcome};
pub use sign_in::{landing_route, sign_out, Portal, SignInFlow};
pub use sign_up::SignUpFlow;
pub use validation::{Field, FieldErrors, SignInForm, SignUpForm, PASSWORDS_DO_NOT_MATCH};
