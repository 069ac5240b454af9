//! Role name constants.
//!
//! Roles are stored as plain strings in the `users.role` column and
//! embedded in JWT claims. Centralizing the names here avoids typo'd
//! string literals scattered across crates.

/// Full administrative access, including listing every vendor.
pub const ROLE_ADMIN: &str = "admin";

/// Default role assigned at registration.
pub const ROLE_USER: &str = "user";
