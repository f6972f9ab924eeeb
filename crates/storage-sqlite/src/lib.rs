//! SQLite storage implementation for fincollect.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the storage traits defined in `fincollect-core` and contains:
//! - Database connection pooling and management
//! - Embedded Diesel migrations
//! - The single-writer actor that serializes every write transaction
//! - Source and record repositories (including the upsert reconciler)
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! `fincollect-core` is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod records;
pub mod sources;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use records::RecordRepository;
pub use sources::SourceRepository;

// Re-export from fincollect-core for convenience
pub use fincollect_core::errors::{DatabaseError, Error, Result};
