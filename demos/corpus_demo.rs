//! End-to-end demo over a tiny synthetic corpus: ingest two fake statute
//! pages, build the retrieval service with the offline embedder, and run a
//! few representative queries.
//!
//! Run with: `cargo run --example corpus_demo`

use anyhow::Result;
use statute_search::embedding::HashingEmbedder;
use statute_search::ingestion::IngestionPipeline;
use statute_search::retrieval::RetrievalOutcome;
use statute_search::store::ChunkStore;
use statute_search::utils::TextUtils;
use statute_search::{Config, RetrievalService};
use std::fs;
use std::sync::Arc;

const IPC_PAGE: &str = "THE INDIAN PENAL CODE\n\
302. Punishment for murder.\n\
Whoever commits murder shall be punished with death, or imprisonment for life, and shall also be liable to fine.\n\
420. Cheating and dishonestly inducing delivery of property.\n\
Whoever cheats and thereby dishonestly induces the person deceived to deliver any property to any person shall be punished with imprisonment which may extend to seven years.\n";

const CRPC_PAGE: &str = "154. Information in cognizable cases.\n\
Every information relating to the commission of a cognizable offence, if given orally to an officer in charge of a police station, shall be reduced to writing and recorded.\n";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let workdir = tempfile::tempdir()?;
    let extracted = workdir.path().join("extracted");
    let chunks = workdir.path().join("chunks");
    fs::create_dir_all(&extracted)?;

    fs::write(extracted.join("ipc_page_001.txt"), IPC_PAGE)?;
    fs::write(extracted.join("crpc_page_001.txt"), CRPC_PAGE)?;

    let mut config = Config::default();
    config.ingestion.extracted_dir = extracted;
    config.storage.chunks_dir = chunks.clone();

    let stats = IngestionPipeline::new(&config).run()?;
    println!(
        "Ingested {} IPC + {} CRPC chunks from {} pages",
        stats.ipc_chunks, stats.crpc_chunks, stats.pages_seen
    );

    let store = ChunkStore::new(&chunks);
    let embedder = Arc::new(HashingEmbedder::new(config.vector.dimension));
    let service = RetrievalService::build(&store, embedder, &config).await?;

    for query in [
        "Explain IPC section 302",
        "what happens when someone cheats and induces delivery of property",
        "CrPC Section 302 punishment",
        "IPC section 999",
    ] {
        println!("\nQuery: {}", query);
        match service.retrieve(query, 3).await? {
            RetrievalOutcome::Results { chunks } => {
                for (i, chunk) in chunks.iter().enumerate() {
                    println!(
                        "  {}. [{} s.{}] {}",
                        i + 1,
                        chunk.law,
                        chunk.section.as_deref().unwrap_or("-"),
                        TextUtils::truncate(&chunk.text, 90)
                    );
                }
            }
            outcome => println!("  {}", outcome.message().unwrap_or_default()),
        }
    }

    Ok(())
}
