pub mod sources;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use docent_chunking::ChunkingConfig;
use docent_service::{Providers, indexing};

#[derive(Debug, Parser)]
#[command(
	version = docent_cli::VERSION,
	rename_all = "kebab",
	styles = docent_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Crawler output JSON.
	#[arg(long, value_name = "FILE")]
	pub crawl: Option<PathBuf>,
	/// Directory of documents (`*.txt`, `*.pdf`).
	#[arg(long, value_name = "DIR")]
	pub documents: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = docent_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	if args.crawl.is_none() && args.documents.is_none() {
		return Err(eyre::eyre!("Pass --crawl, --documents, or both."));
	}

	let mut pages = Vec::new();

	if let Some(path) = &args.crawl {
		pages.extend(sources::load_crawl(path).await?);
	}
	if let Some(dir) = &args.documents {
		pages.extend(sources::load_documents(dir).await?);
	}

	let chunking = ChunkingConfig { max_tokens: config.chunking.max_tokens };
	let chunks = docent_chunking::chunk_pages(&pages, &chunking);

	if chunks.is_empty() {
		tracing::warn!("No content to index. Writing an empty index.");
	}

	let providers = Providers::default();
	let index = indexing::build_index(&config, providers.embedding.as_ref(), &chunks).await?;

	index.save(&config.index.path).await?;

	tracing::info!(
		pages = pages.len(),
		chunks = chunks.len(),
		path = %config.index.path.display(),
		"Index build finished."
	);

	Ok(())
}
