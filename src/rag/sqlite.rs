//! SQLite-backed flat vector index.
//!
//! Vectors live as little-endian f32 BLOBs next to their document ids;
//! search is a brute-force squared-L2 scan, the same access pattern a
//! flat index gives. The index dimension is pinned in a meta table so a
//! reopened database keeps rejecting mismatched vectors.

use std::path::PathBuf;

use async_trait::async_trait;
use ndarray::ArrayView1;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{SearchHit, VectorStore};
use crate::core::config::AppPaths;
use crate::core::errors::ApiError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    dimension: usize,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn new(paths: &AppPaths, dimension: usize) -> Result<Self, ApiError> {
        Self::with_path(paths.index_db_path.clone(), dimension).await
    }

    pub async fn with_path(db_path: PathBuf, dimension: usize) -> Result<Self, ApiError> {
        if dimension == 0 {
            return Err(ApiError::BadRequest(
                "index dimension must be a positive integer".to_string(),
            ));
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self {
            pool,
            dimension,
            db_path,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vectors (
                document_id TEXT PRIMARY KEY,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let stored: Option<String> =
            sqlx::query_scalar("SELECT value FROM index_meta WHERE key = 'dimension'")
                .fetch_optional(&self.pool)
                .await
                .map_err(ApiError::internal)?;

        match stored.and_then(|v| v.parse::<usize>().ok()) {
            Some(found) if found != self.dimension => {
                // Stored index was built for another dimensionality; start
                // over rather than serving unusable neighbors.
                tracing::warn!(
                    "vector index dimension changed ({} -> {}); clearing index",
                    found,
                    self.dimension
                );
                sqlx::query("DELETE FROM vectors")
                    .execute(&self.pool)
                    .await
                    .map_err(ApiError::internal)?;
                self.persist_dimension().await?;
            }
            Some(_) => {}
            None => self.persist_dimension().await?,
        }

        Ok(())
    }

    async fn persist_dimension(&self) -> Result<(), ApiError> {
        sqlx::query("INSERT OR REPLACE INTO index_meta (key, value) VALUES ('dimension', ?1)")
            .bind(self.dimension.to_string())
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn l2_squared(query: &[f32], candidate: &[f32]) -> f32 {
        let query = ArrayView1::from(query);
        let candidate = ArrayView1::from(candidate);
        let diff = &query - &candidate;
        diff.dot(&diff)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn add(&self, entries: Vec<(String, Vec<f32>)>) -> Result<(), ApiError> {
        if entries.is_empty() {
            return Ok(());
        }

        for (document_id, vector) in &entries {
            if vector.len() != self.dimension {
                return Err(ApiError::BadRequest(format!(
                    "Embedding dimension mismatch. Expected {}, got {} for document {}.",
                    self.dimension,
                    vector.len(),
                    document_id
                )));
            }
        }

        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        for (document_id, vector) in &entries {
            let blob = Self::serialize_embedding(vector);
            sqlx::query("INSERT OR REPLACE INTO vectors (document_id, embedding) VALUES (?1, ?2)")
                .bind(document_id)
                .bind(&blob)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, ApiError> {
        if query.len() != self.dimension {
            return Err(ApiError::BadRequest(format!(
                "Query dimension mismatch. Expected {}, got {}.",
                self.dimension,
                query.len()
            )));
        }

        let rows = sqlx::query("SELECT document_id, embedding FROM vectors")
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        let mut hits: Vec<SearchHit> = rows
            .iter()
            .filter_map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&blob);
                if stored.len() != self.dimension {
                    return None;
                }
                Some(SearchHit {
                    document_id: row.get("document_id"),
                    distance: Self::l2_squared(query, &stored),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k.max(1));

        Ok(hits)
    }

    async fn len(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vectors")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }

    async fn clear(&self) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM vectors")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("raglab-index-test-{}.db", uuid::Uuid::new_v4()))
    }

    async fn test_store(dimension: usize) -> SqliteVectorStore {
        SqliteVectorStore::with_path(temp_db_path(), dimension)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn add_and_search_orders_by_distance() {
        let store = test_store(3).await;

        store
            .add(vec![
                ("far".to_string(), vec![10.0, 0.0, 0.0]),
                ("near".to_string(), vec![1.0, 0.0, 0.0]),
                ("exact".to_string(), vec![0.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[0.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document_id, "exact");
        assert!(hits[0].distance.abs() < f32::EPSILON);
        assert_eq!(hits[1].document_id, "near");
    }

    #[tokio::test]
    async fn add_rejects_wrong_dimension() {
        let store = test_store(3).await;
        let err = store
            .add(vec![("bad".to_string(), vec![1.0, 2.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_rejects_wrong_dimension() {
        let store = test_store(3).await;
        let err = store.search(&[1.0], 5).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn search_returns_fewer_hits_than_requested() {
        let store = test_store(2).await;
        store
            .add(vec![("only".to_string(), vec![1.0, 1.0])])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 1.0], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn index_survives_reopen() {
        let path = temp_db_path();

        {
            let store = SqliteVectorStore::with_path(path.clone(), 2).await.unwrap();
            store
                .add(vec![("persisted".to_string(), vec![0.5, 0.5])])
                .await
                .unwrap();
        }

        let reopened = SqliteVectorStore::with_path(path, 2).await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);

        let hits = reopened.search(&[0.5, 0.5], 1).await.unwrap();
        assert_eq!(hits[0].document_id, "persisted");
    }

    #[tokio::test]
    async fn dimension_change_clears_stale_vectors() {
        let path = temp_db_path();

        {
            let store = SqliteVectorStore::with_path(path.clone(), 2).await.unwrap();
            store
                .add(vec![("old".to_string(), vec![0.5, 0.5])])
                .await
                .unwrap();
        }

        let reopened = SqliteVectorStore::with_path(path, 3).await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn re_adding_a_document_replaces_its_vector() {
        let store = test_store(2).await;

        store
            .add(vec![("doc".to_string(), vec![0.0, 1.0])])
            .await
            .unwrap();
        store
            .add(vec![("doc".to_string(), vec![1.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        let hits = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert!(hits[0].distance.abs() < f32::EPSILON);
    }
}
