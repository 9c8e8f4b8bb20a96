//! Auth types shared across YaMDb crates.
//!
//! Provides JWT signing/validation, bearer header parsing and the
//! confirmation-code generator.

pub mod confirmation;
pub mod identity;
pub mod token;
