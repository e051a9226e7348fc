use clap::Parser;
use feed_pipeline::{parse_articles, plugin, Article, Pipeline, PipelineConfig};
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Run articles through a configured filter chain and output set.
#[derive(Debug, Parser)]
#[command(name = "feed-pipeline", version)]
struct Args {
    /// Pipeline configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plugin manifest, overrides the one named in the configuration
    #[arg(short, long)]
    plugins: Option<PathBuf>,

    /// RSS or Atom document to process; JSON lines on stdin otherwise
    #[arg(short, long)]
    feed: Option<PathBuf>,

    /// Print the available filters and outputs, then exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path).map_err(|e| {
            error!("Failed to load configuration {}: {}", path.display(), e);
            e
        })?,
        None => PipelineConfig::default(),
    };
    config.plugins = args
        .plugins
        .clone()
        .or(config.plugins)
        .or_else(|| Some(plugin::default_manifest_path()));

    let pipeline = Pipeline::from_config(&config).await?;

    if args.list {
        println!("Filters:");
        for spec in pipeline.filters().available_filters().await {
            println!("  {:<12} {}", spec.name, spec.desc);
        }
        println!("Outputs:");
        for spec in pipeline.outputs().available_outputs().await {
            println!("  {:<12} {}", spec.name, spec.desc);
        }
        return Ok(());
    }

    let articles = match &args.feed {
        Some(path) => parse_articles(&std::fs::read_to_string(path)?)?,
        None => read_json_lines()?,
    };
    info!("Processing {} articles", articles.len());

    let stats = pipeline.process_all(articles).await;
    if stats.dropped > 0 || stats.partially_delivered > 0 {
        warn!("{:?}", stats);
    }
    Ok(())
}

fn read_json_lines() -> Result<Vec<Article>, Box<dyn std::error::Error>> {
    let mut articles = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        articles.push(serde_json::from_str(&line)?);
    }
    Ok(articles)
}
