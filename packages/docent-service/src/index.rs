use std::sync::Arc;

use docent_config::{Config, EmbeddingProviderConfig};
use docent_domain::Passage;
use docent_storage::vector_index::VectorIndex;

use crate::{BoxFuture, EmbeddingProvider, Error, Result, SearchIndex};

/// What the search layer found for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
	/// No index was built, or the loaded one holds no passages.
	NotIndexed,
	/// At most `top_k` passages, unordered.
	Candidates(Vec<Passage>),
}

/// Embeds the query and scans a [`VectorIndex`] loaded at startup.
pub struct EmbeddingIndex {
	index: Option<VectorIndex>,
	cfg: EmbeddingProviderConfig,
	embedding: Arc<dyn EmbeddingProvider>,
}
impl EmbeddingIndex {
	pub async fn load(cfg: &Config, embedding: Arc<dyn EmbeddingProvider>) -> Result<Self> {
		let index = VectorIndex::load(&cfg.index.path).await?;

		if index.is_none() {
			tracing::warn!(path = %cfg.index.path.display(), "No index found. Run the indexer first.");
		}

		Ok(Self::from_index(index, cfg, embedding))
	}

	/// Drops an index built for a different embedding model rather than comparing vectors from
	/// different spaces.
	pub fn from_index(
		index: Option<VectorIndex>,
		cfg: &Config,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		let expected = crate::embedding_version(cfg);
		let index = index.filter(|index| {
			let matches = index.embedding_version == expected;

			if !matches {
				tracing::warn!(
					found = %index.embedding_version,
					expected = %expected,
					"Ignoring index built with a different embedding version."
				);
			}

			matches
		});

		if let Some(index) = &index {
			tracing::info!(entries = index.len(), "Loaded vector index.");
		}

		Self { index, cfg: cfg.providers.embedding.clone(), embedding }
	}

	pub fn is_loaded(&self) -> bool {
		self.index.as_ref().is_some_and(|index| !index.is_empty())
	}
}
impl SearchIndex for EmbeddingIndex {
	fn search<'a>(&'a self, query: &'a str, top_k: u32) -> BoxFuture<'a, Result<Retrieval>> {
		Box::pin(async move {
			let Some(index) = self.index.as_ref().filter(|index| !index.is_empty()) else {
				return Ok(Retrieval::NotIndexed);
			};
			let vectors = self.embedding.embed(&self.cfg, &[query.to_string()]).await?;
			let Some(vector) = vectors.into_iter().next() else {
				return Err(Error::Provider {
					message: "Embedding provider returned no vectors.".to_string(),
				});
			};
			let passages = index
				.search(&vector, top_k as usize)
				.into_iter()
				.map(|(text, score)| Passage::new(text, score))
				.collect();

			Ok(Retrieval::Candidates(passages))
		})
	}
}
