use std::path::Path;

use anyhow::{ensure, Result};
use console::style;

use punbeam::document::load_pdf;
use punbeam::embeddings::{Embedder, OllamaEmbeddings, OllamaEmbeddingsConfig};
use punbeam::splitter::TextSplitter;
use punbeam::vector_store::InMemoryVectorStore;

/// One-shot retrieval demo: load a PDF, chunk it, embed the chunks into an
/// in-memory vector store, and run a similarity query against it.
pub async fn run(file: &Path, query: &str, k: usize) -> Result<()> {
    let config = OllamaEmbeddingsConfig::from_env()?;
    println!(
        "Embedding with {} at {}",
        style(&config.model).bold(),
        style(&config.host).underlined()
    );

    let document = load_pdf(file)?;
    let splitter = TextSplitter::default();
    let chunks = splitter.split_documents(&[document]);
    println!("Split {} into {} chunks", file.display(), chunks.len());

    let embedder = OllamaEmbeddings::new(config)?;

    // Sanity check: one embedding configuration produces vectors of one length
    if chunks.len() >= 2 {
        let sample = embedder
            .embed(&[
                chunks[0].page_content.clone(),
                chunks[1].page_content.clone(),
            ])
            .await?;
        ensure!(
            sample[0].len() == sample[1].len(),
            "Embedding lengths diverge: {} vs {}",
            sample[0].len(),
            sample[1].len()
        );
        println!("Generated vectors of length {}\n", sample[0].len());
    }

    let mut store = InMemoryVectorStore::new(Box::new(embedder));
    store.add_documents(chunks).await?;

    let results = store.similarity_search(query, k).await?;
    match results.first() {
        Some(hit) => {
            println!(
                "Top match (score {:.4}, source {}):",
                hit.score,
                hit.document
                    .metadata
                    .get("source")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
            );
            println!("{}", hit.document.page_content);
        }
        None => println!("No matches for: {}", query),
    }

    Ok(())
}
