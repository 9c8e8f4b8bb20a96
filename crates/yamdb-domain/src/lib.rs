//! Domain types shared across YaMDb crates.
//!
//! This crate contains only pure types and decision functions with no framework
//! dependencies. Import in `usecase/` and `domain/` layers; never in `infra/`.

pub mod access;
pub mod pagination;
pub mod rating;
pub mod user;
