//! Request handlers, grouped by resource.

pub mod auth;
pub mod product;
pub mod vendor;
