//! # Scribe Shared
//!
//! Response envelopes and the page documents the server renders.
//! Kept free of server dependencies so clients can deserialize them too.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
