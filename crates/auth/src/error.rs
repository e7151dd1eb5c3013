use thiserror::Error;

use hireloop_api::ApiError;
use hireloop_session::SessionError;

use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(#[from] FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not persist session: {0}")]
    Session(#[from] SessionError),
    #[error("google sign-in is not configured")]
    OAuthDisabled,
    #[error("oauth state does not match the pending sign-in")]
    StateMismatch,
    #[error("oauth error: {0}")]
    OAuth(#[from] anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Text shown to the user when a flow fails.
pub fn user_message(error: &AuthError) -> String {
    match error {
        AuthError::Api(ApiError::Server { message, .. }) => message.clone(),
        AuthError::Api(ApiError::Unauthorized(message)) if !message.is_empty() => message.clone(),
        AuthError::Api(ApiError::Unauthorized(_)) => "Invalid email or password".to_string(),
        AuthError::Api(ApiError::MissingToken(_)) => {
            "Your sign-up session has expired, please sign up again".to_string()
        }
        AuthError::Api(ApiError::Transport(_)) => {
            "Unable to reach the server, please try again".to_string()
        }
        AuthError::Api(_) => "Something went wrong, please try again".to_string(),
        other => other.to_string(),
    }
}
