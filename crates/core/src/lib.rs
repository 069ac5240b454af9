//! Pure domain logic for the catalog platform.
//!
//! This crate has no I/O, no async, and no database dependencies. The
//! `db`, `importer`, and `api` crates build on the types and validation
//! functions defined here.

pub mod error;
pub mod import;
pub mod roles;
pub mod types;
