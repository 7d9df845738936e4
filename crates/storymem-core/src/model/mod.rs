//! Model module - Core types for children, stories and feedback
//!
//! Implements the reading-progress model with:
//! - Child profiles with a bounded, monotonically increasing reading level
//! - Stories with optional semantic embeddings
//! - Feedback that drives reading-level increments

mod child;
mod feedback;
mod story;

pub use child::{
    Child, NewChild, DEFAULT_READING_LEVEL, LEVEL_UP_THRESHOLD, MAX_READING_LEVEL,
    MIN_READING_LEVEL,
};
pub use feedback::{FeedbackReceipt, NewFeedback, Progress, ProgressStats};
pub use story::{NewStory, Story};
