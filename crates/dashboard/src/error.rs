use thiserror::Error;

use hireloop_api::ApiError;

use crate::jobs::{ApplicationError, JobPostError};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    JobPost(#[from] JobPostError),
    #[error(transparent)]
    Application(#[from] ApplicationError),
    #[error("{0}")]
    Invalid(&'static str),
    /// The owning view went away; the result was dropped.
    #[error("view closed before the request finished")]
    Closed,
}

impl DashboardError {
    pub fn is_closed(&self) -> bool {
        matches!(self, DashboardError::Closed)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DashboardError::Api(err) if err.is_unauthorized())
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
