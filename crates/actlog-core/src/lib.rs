//! Core types and trait definitions for the actlog activity store.
//!
//! This crate is deliberately free of file, HTTP and runtime dependencies.
//! Backends and the host shell depend on it; it depends on nothing of theirs.

pub mod activity;
pub mod error;
pub mod store;

pub use activity::{Activity, NewActivity};
pub use error::{Error, Result};
pub use store::ActivityStore;
