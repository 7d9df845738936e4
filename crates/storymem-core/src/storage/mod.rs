//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Versioned schema migrations
//! - Story embeddings stored inline as f32 blobs
//! - Transactional feedback with atomic reading-level increments

mod migrations;
mod sqlite;

pub use migrations::{Migration, MIGRATIONS};
pub use sqlite::{Result, Storage, StorageError, StorageStats};
