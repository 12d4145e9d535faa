//! Middleware modules - extractors and error mapping.

pub mod auth;
pub mod error;
pub mod upload;
