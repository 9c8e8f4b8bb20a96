//! Test utilities for YaMDb services.
//!
//! Import in `#[cfg(test)]` blocks and `tests/` only.

pub mod auth;
