//! Mock providers and fixtures

mod embedders;

pub use embedders::{FailingEmbedder, KeywordAxisEmbedder, AXES};
pub use fixtures::{alice, child_named, story};
