//! # routeguard-core
//!
//! Shared primitives for the routeguard workspace:
//! - [`error`] - core error types and categories
//! - [`codes`] - wire error codes and their HTTP status mapping
//! - [`response`] - the structured error envelope written to clients
//! - [`time`] - UTC timestamp handling (RFC 3339)
//! - [`id`] - request trace id generation

pub mod codes;
pub mod error;
pub mod id;
pub mod response;
pub mod time;

pub use codes::ErrorCode;
pub use error::{CoreError, ErrorCategory, Result};
pub use id::generate_trace_id;
pub use response::ApiErrorResponse;
pub use time::UtcTimestamp;
