pub mod ask;
pub mod index;
pub mod indexing;
pub mod record;
pub mod synthesis;

mod error;

pub use ask::{AskRequest, AskResponse, DebugAskResponse};
pub use error::{Error, Result};
pub use index::{EmbeddingIndex, Retrieval};
pub use record::{InteractionRecord, StoredInteraction};
pub use synthesis::Synthesis;

use std::{future::Future, pin::Pin, sync::Arc};

use docent_config::{Config, EmbeddingProviderConfig, RewriteProviderConfig};
use docent_domain::Passage;
use docent_providers::{embedding, rewrite};
use docent_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Similarity search over the indexed corpus.
///
/// Returned candidates carry no ordering or uniqueness guarantee.
pub trait SearchIndex
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str, top_k: u32) -> BoxFuture<'a, Result<Retrieval>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait RewriteProvider
where
	Self: Send + Sync,
{
	fn rewrite<'a>(
		&'a self,
		cfg: &'a RewriteProviderConfig,
		question: &'a str,
		passages: &'a [Passage],
	) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rewrite: Arc<dyn RewriteProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, rewrite: Arc<dyn RewriteProvider>) -> Self {
		Self { embedding, rewrite }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), rewrite: provider }
	}
}

pub struct DocentService {
	pub cfg: Config,
	pub db: Db,
	pub index: Arc<dyn SearchIndex>,
	pub providers: Providers,
}
impl DocentService {
	pub fn new(cfg: Config, db: Db, index: Arc<dyn SearchIndex>) -> Self {
		Self { cfg, db, index, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		db: Db,
		index: Arc<dyn SearchIndex>,
		providers: Providers,
	) -> Self {
		Self { cfg, db, index, providers }
	}

	/// Connects storage, prepares the schema, and loads the persisted index with the default
	/// providers.
	pub async fn open(cfg: Config) -> Result<Self> {
		let db = Db::connect(&cfg.storage.sqlite).await?;

		db.ensure_schema().await?;

		let providers = Providers::default();
		let index = EmbeddingIndex::load(&cfg, providers.embedding.clone()).await?;

		Ok(Self::with_providers(cfg, db, Arc::new(index), providers))
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl RewriteProvider for DefaultProviders {
	fn rewrite<'a>(
		&'a self,
		cfg: &'a RewriteProviderConfig,
		question: &'a str,
		passages: &'a [Passage],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(rewrite::rewrite(cfg, question, passages).await?) })
	}
}

/// Identifies the vector space an index was built in.
pub fn embedding_version(cfg: &Config) -> String {
	format!(
		"{}:{}:{}",
		cfg.providers.embedding.provider_id,
		cfg.providers.embedding.model,
		cfg.providers.embedding.dimensions
	)
}
