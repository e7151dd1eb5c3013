//! # Hireloop API Crate
//!
//! Typed access to the REST backend: authentication, profile, jobs,
//! subscriptions, admin listings, network requests, feed, notifications and
//! chat history. DTOs live in [`models`], paths in [`endpoints`].
//!
//! Errors are never retried here. Callers log them and surface a notice, or
//! redirect on [`ApiError::is_unauthorized`].

pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
