//! HTTP API for entity detection and redaction.

pub mod docs;
pub mod error;
pub mod extract;
pub mod openapi;
pub mod server;

pub use error::ApiError;
pub use server::{ApiServer, AppState, router, with_error_handling};
