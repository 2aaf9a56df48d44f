use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use embed::{DEFAULT_URL, EmbeddingClient, EmbeddingConfig};
use extract::{ExtractorConfig, LineSplitter, SchemaNode, TripletExtractor};

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(about = "Schema-to-knowledge-graph ingestion passes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract graph triplets from a schema description file.
    Extract {
        /// Schema description, one table name or foreign-key line per record.
        #[arg(short, long)]
        input: PathBuf,
        /// Root directory holding per-table column listings under columns/.
        #[arg(short, long, default_value = "data")]
        directory: String,
        /// Write the augmented records here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Request one embedding from the embedding service.
    Embed {
        /// Model identifier sent with the request.
        #[arg(short, long)]
        model: String,
        #[arg(long, default_value = DEFAULT_URL)]
        base_url: String,
        /// Endpoint subpath on the service.
        #[arg(long, default_value = "/embed")]
        subpath: String,
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
        /// Treat the text as a retrieval query instead of a document.
        #[arg(long)]
        query: bool,
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Extract {
            input,
            directory,
            output,
        } => run_extract(input, directory, output).await,
        Command::Embed {
            model,
            base_url,
            subpath,
            timeout_secs,
            query,
            text,
        } => run_embed(model, base_url, subpath, timeout_secs, query, text).await,
    }
}

async fn run_extract(input: PathBuf, directory: String, output: Option<PathBuf>) -> Result<()> {
    let text = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;

    let nodes: Vec<SchemaNode> = LineSplitter::new()
        .split(&text)
        .into_iter()
        .map(SchemaNode::new)
        .collect();

    let extractor = TripletExtractor::new(ExtractorConfig {
        directory,
        ..ExtractorConfig::default()
    });
    let nodes = extractor
        .transform(nodes)
        .context("triplet extraction failed")?;

    let mut entities = 0;
    let mut relations = 0;
    for node in &nodes {
        entities += node.kg_nodes()?.len();
        relations += node.kg_relations()?.len();
    }
    info!(records = nodes.len(), entities, relations, "extraction finished");

    let rendered = serde_json::to_string_pretty(&nodes)?;
    match output {
        Some(path) => tokio::fs::write(&path, rendered)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}

async fn run_embed(
    model: String,
    base_url: String,
    subpath: String,
    timeout_secs: u64,
    query: bool,
    text: String,
) -> Result<()> {
    let client = EmbeddingClient::new(EmbeddingConfig {
        model,
        base_url,
        subpath: Some(subpath),
        timeout_secs,
        headers: None,
    })
    .context("invalid embedding service configuration")?;

    let vector = if query {
        client.query_embedding_async(&text).await
    } else {
        client.text_embedding_async(&text).await
    }
    .context("embedding request failed")?;

    info!(dimensions = vector.len(), "embedding received");
    println!("{}", serde_json::to_string(&vector)?);

    Ok(())
}
