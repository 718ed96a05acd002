use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;

/// Turns identified text batches into `(document_id, vector)` pairs using
/// the configured embedding model.
#[derive(Clone)]
pub struct EmbeddingGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl EmbeddingGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate embeddings for parallel lists of ids and documents.
    ///
    /// The backend must return exactly one vector per input document.
    pub async fn generate_from_texts(
        &self,
        identifiers: &[String],
        documents: &[String],
    ) -> Result<Vec<(String, Vec<f32>)>, ApiError> {
        if identifiers.is_empty() && documents.is_empty() {
            return Ok(Vec::new());
        }

        if identifiers.len() != documents.len() {
            return Err(ApiError::BadRequest(
                "Identifiers and documents must have the same length.".to_string(),
            ));
        }

        let vectors = self.provider.embed(documents, &self.model).await?;

        if vectors.len() != identifiers.len() {
            return Err(ApiError::Internal(
                "Embedding model returned unexpected number of vectors.".to_string(),
            ));
        }

        Ok(identifiers.iter().cloned().zip(vectors).collect())
    }
}
