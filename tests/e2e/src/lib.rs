//! Storymem end-to-end test support
//!
//! - `harness`: isolated temporary databases wired into a [`storymem_core::StoryMemory`]
//! - `mocks`: deterministic embedding providers and data builders

pub mod harness;
pub mod mocks;
