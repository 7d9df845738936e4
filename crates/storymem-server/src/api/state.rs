//! Shared application state

use std::sync::Arc;

use storymem_core::StoryMemory;

/// State shared by every request
///
/// Built once at startup from [`crate::ServerConfig`]; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub memory: StoryMemory,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(memory: StoryMemory, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            memory,
            api_key: api_key.into(),
        }
    }
}
