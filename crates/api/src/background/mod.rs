//! Long-running background tasks spawned at startup.

pub mod import_runner;
