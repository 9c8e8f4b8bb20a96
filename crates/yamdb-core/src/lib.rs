//! Service plumbing shared by YaMDb binaries: configuration loading, tracing
//! setup, request-id middleware, health handlers and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
