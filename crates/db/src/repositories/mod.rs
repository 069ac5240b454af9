//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod product_repo;
pub mod session_repo;
pub mod user_repo;
pub mod vendor_repo;

pub use product_repo::ProductRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use vendor_repo::VendorRepo;
