//! Observability - request IDs and per-request spans.

mod request_id;

pub use request_id::{RequestId, RequestIdMiddleware};
