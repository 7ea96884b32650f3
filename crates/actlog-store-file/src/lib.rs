//! Newline-delimited datafile backend for the actlog activity store.
//!
//! The whole collection lives in one file, one JSON record per line, and is
//! held in memory once loaded. Writes are appends serialised behind an async
//! mutex; reads never touch the disk.

mod datafile;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{FileStore, StoreOptions};
