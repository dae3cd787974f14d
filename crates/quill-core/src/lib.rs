//! # Quill Core
//!
//! The domain layer of the Quill blog service.
//! This crate contains the post model, business rules and the storage port,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::PostService;
