//! Test harness


pub use db_manager::{TestMemory, TEST_API_KEY};
