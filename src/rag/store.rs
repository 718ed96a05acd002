//! VectorStore trait — abstract interface for the flat vector index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// One nearest-neighbor hit. Distance is squared L2; smaller is closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: String,
    pub distance: f32,
}

/// Abstract flat vector index over fixed-dimension embeddings.
///
/// Implementations persist both vectors and their document ids, so a
/// restarted process searches the same index it left behind.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Dimensionality every stored vector must have.
    fn dimension(&self) -> usize;

    /// Insert `(document_id, vector)` pairs. An empty batch is a no-op;
    /// re-adding an existing document id replaces its vector.
    async fn add(&self, entries: Vec<(String, Vec<f32>)>) -> Result<(), ApiError>;

    /// Nearest neighbors of `query` by squared L2 distance, ascending,
    /// at most `top_k` results.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, ApiError>;

    /// Number of stored vectors.
    async fn len(&self) -> Result<usize, ApiError>;

    /// Remove every stored vector.
    async fn clear(&self) -> Result<(), ApiError>;
}
