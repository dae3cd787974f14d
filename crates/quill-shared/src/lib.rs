//! # Quill Shared
//!
//! Request and response types of the HTTP API.
//! Kept free of server dependencies so clients can reuse them.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, PagedResponse};
