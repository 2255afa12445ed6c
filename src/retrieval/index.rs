//! SQLite-backed vector index for the heritage corpus.
//!
//! The index file is produced offline (corpus ingestion is a separate,
//! one-off step); a running process opens it once at startup and treats it
//! as read-only. Search is brute-force cosine similarity over the stored
//! embedding BLOBs.

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::passage::Provenance;
use crate::core::config::AppPaths;
use crate::core::errors::ApiError;

/// A passage stored in the index.
#[derive(Debug, Clone)]
pub struct IndexedPassage {
    pub passage_id: String,
    pub content: String,
    pub provenance: Provenance,
}

/// An index hit with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct IndexSearchResult {
    pub passage: IndexedPassage,
    pub similarity: f32,
}

pub struct VectorIndex {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl VectorIndex {
    pub async fn new(paths: &AppPaths) -> Result<Self, ApiError> {
        Self::with_path(paths.index_db_path.clone()).await
    }

    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let index = Self { pool, db_path };
        index.init_schema().await?;
        Ok(index)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS heritage_passages (
                passage_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                provenance TEXT NOT NULL DEFAULT '[]',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_passage_source ON heritage_passages(source)")
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

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_passage(row: &sqlx::sqlite::SqliteRow) -> IndexedPassage {
        let provenance_str: String = row.get("provenance");
        let provenance = serde_json::from_str::<Provenance>(&provenance_str).unwrap_or_default();

        IndexedPassage {
            passage_id: row.get("passage_id"),
            content: row.get("content"),
            provenance,
        }
    }

    /// Insert passages with their embeddings in one transaction.
    ///
    /// Used by ingestion tooling and tests; a serving process never writes.
    pub async fn insert_batch(
        &self,
        items: Vec<(IndexedPassage, Vec<f32>)>,
    ) -> Result<(), ApiError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        for (passage, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            let provenance_str =
                serde_json::to_string(&passage.provenance).map_err(ApiError::internal)?;
            let source = passage.provenance.source().unwrap_or("").to_string();

            sqlx::query(
                "INSERT OR REPLACE INTO heritage_passages
                     (passage_id, content, source, provenance, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&passage.passage_id)
            .bind(&passage.content)
            .bind(&source)
            .bind(&provenance_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(())
    }

    /// Top-K passages by descending cosine similarity to `query_embedding`.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexSearchResult>, ApiError> {
        let rows = sqlx::query(
            "SELECT passage_id, content, source, provenance, embedding
             FROM heritage_passages",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let mut scored: Vec<IndexSearchResult> = rows
            .iter()
            .filter_map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                if embedding_bytes.is_empty() {
                    return None;
                }
                let stored_emb = Self::deserialize_embedding(&embedding_bytes);
                let similarity = Self::cosine_similarity(query_embedding, &stored_emb);

                Some(IndexSearchResult {
                    passage: Self::row_to_passage(row),
                    similarity,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k.max(1));

        Ok(scored)
    }

    pub async fn count(&self) -> Result<usize, ApiError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM heritage_passages")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        let count: i64 = row.get("cnt");
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(id: &str, content: &str, source: &str) -> IndexedPassage {
        let mut provenance = Provenance::new();
        provenance.insert("source", source);
        provenance.insert("title", format!("{id} title"));
        IndexedPassage {
            passage_id: id.to_string(),
            content: content.to_string(),
            provenance,
        }
    }

    async fn temp_index() -> (tempfile::TempDir, VectorIndex) {
        let dir = tempfile::tempdir().expect("tempdir");
        let index = VectorIndex::with_path(dir.path().join("index.db"))
            .await
            .expect("index should open");
        (dir, index)
    }

    #[tokio::test]
    async fn search_returns_most_similar_first() {
        let (_dir, index) = temp_index().await;

        index
            .insert_batch(vec![
                (indexed("p1", "housing history", "Sec1 Unit 4"), vec![1.0, 0.0, 0.0]),
                (indexed("p2", "kampong life", "Infopedia"), vec![0.0, 1.0, 0.0]),
                (indexed("p3", "port trade", "Roots Website"), vec![0.7, 0.7, 0.0]),
            ])
            .await
            .expect("insert should work");

        let hits = index.search(&[1.0, 0.0, 0.0], 2).await.expect("search");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].passage.passage_id, "p1");
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[tokio::test]
    async fn provenance_round_trips_in_insertion_order() {
        let (_dir, index) = temp_index().await;

        index
            .insert_batch(vec![(
                indexed("p1", "housing history", "Sec1 Unit 4"),
                vec![0.5, 0.5],
            )])
            .await
            .expect("insert should work");

        let hits = index.search(&[0.5, 0.5], 1).await.expect("search");
        let fields: Vec<_> = hits[0].passage.provenance.iter().collect();

        assert_eq!(fields[0], ("source", "Sec1 Unit 4"));
        assert_eq!(fields[1], ("title", "p1 title"));
    }

    #[tokio::test]
    async fn count_reflects_inserted_rows() {
        let (_dir, index) = temp_index().await;
        assert_eq!(index.count().await.expect("count"), 0);

        index
            .insert_batch(vec![
                (indexed("p1", "a", "Infopedia"), vec![1.0]),
                (indexed("p2", "b", "Infopedia"), vec![0.5]),
            ])
            .await
            .expect("insert should work");

        assert_eq!(index.count().await.expect("count"), 2);
    }
}
