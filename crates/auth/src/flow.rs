use hireloop_session::Route;

use crate::error::{user_message, AuthError};
use crate::validation::FieldErrors;

/// Where a form is in its submit cycle.
///
/// `Idle` doubles as the "entering" state of the OTP page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle {
        error: Option<String>,
        fields: FieldErrors,
    },
    Submitting,
    Completed {
        redirect: Route,
    },
}

impl Default for FlowState {
    fn default() -> Self {
        FlowState::Idle {
            error: None,
            fields: FieldErrors::default(),
        }
    }
}

impl FlowState {
    pub fn failed(error: &AuthError) -> Self {
        match error {
            AuthError::Validation(fields) => FlowState::Idle {
                error: None,
                fields: fields.clone(),
            },
            other => FlowState::Idle {
                error: Some(user_message(other)),
                fields: FieldErrors::default(),
            },
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, FlowState::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FlowState::Idle { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FlowState::Idle { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    pub fn redirect(&self) -> Option<Route> {
        match self {
            FlowState::Completed { redirect } => Some(*redirect),
            _ => None,
        }
    }
}
