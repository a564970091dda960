//! Content memory
//!
//! Single-slot store for the last remembered text blob.

pub mod store;

pub use store::{ContentMemory, StoredContent};
