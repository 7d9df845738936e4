//! Embedding vectors and distance functions

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum text length (in chars) sent for embedding; longer text is truncated
pub const MAX_TEXT_LENGTH: usize = 8192;

// ============================================================================
// EMBEDDING TYPE
// ============================================================================

/// A semantic embedding vector
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector
    pub vector: Vec<f32>,
    /// Dimensions of the vector
    pub dimensions: usize,
}

impl Embedding {
    /// Create a new embedding from a vector
    pub fn new(vector: Vec<f32>) -> Self {
        let dimensions = vector.len();
        Self { vector, dimensions }
    }

    /// Cosine distance to another embedding, `None` when dimensions differ
    pub fn distance_to(&self, other: &Embedding) -> Option<f32> {
        if self.dimensions != other.dimensions || self.dimensions == 0 {
            return None;
        }
        Some(cosine_distance(&self.vector, &other.vector))
    }

    /// Convert to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        self.vector.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Create from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return None;
        }
        let vector: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Some(Self::new(vector))
    }
}

// ============================================================================
// SIMILARITY FUNCTIONS
// ============================================================================

/// Compute cosine similarity between two vectors
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator > 0.0 {
        dot_product / denominator
    } else {
        0.0
    }
}

/// Cosine distance (`1 - similarity`), 0.0 for identical direction, 2.0 for opposite
#[inline]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Truncate to at most `MAX_TEXT_LENGTH` chars without splitting a char
pub fn truncate_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_TEXT_LENGTH) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ============================================================================
// TESTS
// ============================================================================
