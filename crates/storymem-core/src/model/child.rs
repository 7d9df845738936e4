//! Child profile - the reader stories are written for

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// READING LEVEL RULES
// ============================================================================

/// Lowest reading level a profile can hold
pub const MIN_READING_LEVEL: i32 = 1;

/// Ceiling for feedback-driven increments
pub const MAX_READING_LEVEL: i32 = 10;

/// Reading level given to new profiles when none is requested
pub const DEFAULT_READING_LEVEL: i32 = 1;

/// Comprehension score that must be exceeded (strictly) to level up
pub const LEVEL_UP_THRESHOLD: i32 = 80;

// ============================================================================
// CHILD
// ============================================================================

/// A child profile as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    /// Generated identifier
    pub id: i64,
    pub name: String,
    pub age: i32,
    /// Current reading level (1-10)
    pub reading_level: i32,
    /// Unordered interest tags
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a child profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewChild {
    pub name: String,
    pub age: i32,
    /// Falls back to the configured default when absent
    #[serde(default)]
    pub reading_level: Option<i32>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl NewChild {
    /// Check field constraints before anything touches the database
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.age < 0 {
            return Err(format!("age must not be negative (got {})", self.age));
        }
        if let Some(level) = self.reading_level {
            if !(MIN_READING_LEVEL..=MAX_READING_LEVEL).contains(&level) {
                return Err(format!(
                    "reading_level must be between {} and {} (got {})",
                    MIN_READING_LEVEL, MAX_READING_LEVEL, level
                ));
            }
        }
        Ok(())
    }

    /// Reading level to store, given the configured default
    pub fn effective_reading_level(&self, default_level: i32) -> i32 {
        self.reading_level.unwrap_or(default_level)
    }
}
