//! # Scribe Core
//!
//! The domain layer of the Scribe blogging service.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! records, pagination, form validation, ports and the use-case service.

pub mod domain;
pub mod error;
pub mod forms;
pub mod ports;
pub mod services;

pub use error::{DomainError, ValidationErrors};
pub use services::BlogService;
