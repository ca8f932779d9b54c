//! Pieces shared by the HTTP handlers.

pub mod identity;
pub mod tracing;
