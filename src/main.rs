use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use kgraph::http::HttpGraphServer;
use kgraph::{CandidateRow, Config, GraphService};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "kgraph")]
#[command(about = "In-memory knowledge graph service")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API over HTTP
    Serve {
        /// Bind host (overrides http_server.host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides http_server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Load a JSON array of header -> value records into a fresh graph and report
    Ingest {
        /// Path to the JSON records file
        file: PathBuf,

        /// Query to run after loading: entity, relationship or path
        #[arg(long, requires = "query_value")]
        query_type: Option<String>,

        /// Query value, e.g. "Alice" or "Alice to Carol"
        #[arg(long, requires = "query_type")]
        query_value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    // Log to stderr; RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.graph.log_level.as_str()),
    )
    .init();

    match args.command {
        Command::Serve { host, port } => run_server(config, host, port).await,
        Command::Ingest {
            file,
            query_type,
            query_value,
        } => run_ingest(&config, &file, query_type.zip(query_value)),
    }
}

async fn run_server(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.http_server.host = host;
    }
    if let Some(port) = port {
        config.http_server.port = port;
    }

    log::info!("Starting kgraph v{}", env!("CARGO_PKG_VERSION"));
    let service = Arc::new(GraphService::from_config(&config));
    let server = HttpGraphServer::new(service, &config);

    server.run(&config.bind_addr()).await?;
    Ok(())
}

fn run_ingest(config: &Config, file: &Path, query: Option<(String, String)>) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read records file: {}", file.display()))?;
    let records: Vec<IndexMap<String, String>> = serde_json::from_str(&content)
        .with_context(|| format!("Expected a JSON array of records in {}", file.display()))?;
    log::info!("Loaded {} record(s) from {}", records.len(), file.display());

    let service = GraphService::from_config(config);
    let report = service.bulk_add(records.iter().map(|record| CandidateRow::from_record(record)))?;
    let stats = service.stats()?;
    let query = match query {
        Some((kind, value)) => Some(service.query(&kind, &value)?),
        None => None,
    };

    let output = json!({
        "added_count": report.added_count,
        "errors": report.error_messages(),
        "stats": stats,
        "query": query,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
