//! Retrieval scaffolding shared by the workshop pipelines.
//!
//! This module provides:
//! - `DocumentChunker`: splits documents into overlapping text windows
//! - `EmbeddingGenerator`: turns chunk batches into `(id, vector)` pairs
//! - `VectorStore` / `SqliteVectorStore`: flat L2 nearest-neighbor index

pub mod chunker;
pub mod embedder;
pub mod sqlite;
pub mod store;

pub use chunker::{ChunkedRecords, DocumentChunker};
pub use embedder::EmbeddingGenerator;
pub use sqlite::SqliteVectorStore;
pub use store::{SearchHit, VectorStore};
