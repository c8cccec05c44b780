use anyhow::Result;
use uuid::Uuid;

use crate::document::Document;
use crate::embeddings::Embedder;

/// A document matched by a similarity query, with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub id: String,
    pub score: f32,
    pub document: Document,
}

struct StoredDocument {
    id: String,
    vector: Vec<f32>,
    document: Document,
}

/// In-memory vector store: embeds documents on insert and answers similarity
/// queries with a linear cosine scan. Ordering is deterministic: score
/// descending, insertion order as the tiebreak.
pub struct InMemoryVectorStore {
    embedder: Box<dyn Embedder>,
    entries: Vec<StoredDocument>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed and store documents, returning the assigned ids
    pub async fn add_documents(&mut self, documents: Vec<Document>) -> Result<Vec<String>> {
        let texts: Vec<String> = documents
            .iter()
            .map(|d| d.page_content.clone())
            .collect();
        let vectors = self.embedder.embed(&texts).await?;

        let mut ids = Vec::with_capacity(documents.len());
        for (document, vector) in documents.into_iter().zip(vectors) {
            let id = Uuid::new_v4().to_string();
            ids.push(id.clone());
            self.entries.push(StoredDocument {
                id,
                vector,
                document,
            });
        }
        Ok(ids)
    }

    /// Embed the query and return the top `k` documents by cosine similarity
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        let query_vector = self.embedder.embed_query(query).await?;

        let mut scored: Vec<ScoredDocument> = self
            .entries
            .iter()
            .map(|entry| ScoredDocument {
                id: entry.id.clone(),
                score: cosine_similarity(&entry.vector, &query_vector),
                document: entry.document.clone(),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder: maps known words onto axis-aligned vectors
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    vec![
                        text.matches("nike").count() as f32,
                        text.matches("weather").count() as f32,
                        text.matches("rust").count() as f32,
                    ]
                })
                .collect())
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);

        let opposite = cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]);
        assert!((opposite + 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_add_documents_assigns_unique_ids() -> Result<()> {
        let mut store = InMemoryVectorStore::new(Box::new(KeywordEmbedder));
        let ids = store
            .add_documents(vec![
                Document::new("nike distribution"),
                Document::new("weather report"),
            ])
            .await?;

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_similarity_search_ranks_best_match_first() -> Result<()> {
        let mut store = InMemoryVectorStore::new(Box::new(KeywordEmbedder));
        store
            .add_documents(vec![
                Document::new("rust borrow checker"),
                Document::new("nike has many distribution centers, nike ships fast"),
                Document::new("weather is sunny"),
            ])
            .await?;

        let results = store
            .similarity_search("how many distribution centers does nike have", 2)
            .await?;

        assert_eq!(results.len(), 2);
        assert!(results[0]
            .document
            .page_content
            .contains("distribution centers"));
        assert!(results[0].score >= results[1].score);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_empty_store() -> Result<()> {
        let store = InMemoryVectorStore::new(Box::new(KeywordEmbedder));
        let results = store.similarity_search("anything nike", 4).await?;
        assert!(results.is_empty());
        Ok(())
    }
}
