//! Fincollect Core - Domain entities, services, and traits.
//!
//! This crate contains the collection logic: the record model, the collectors
//! that turn provider payloads into records, watermark resolution and the
//! price lookup. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod collection;
pub mod collectors;
pub mod constants;
pub mod errors;
pub mod prices;
pub mod records;
pub mod registry;
pub mod sources;
pub mod utils;
pub mod watermark;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
