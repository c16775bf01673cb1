use docent_chunking::Chunk;
use docent_config::Config;
use docent_storage::vector_index::{IndexEntry, VectorIndex};

use crate::{EmbeddingProvider, Error, Result};

pub const EMBED_BATCH_SIZE: usize = 64;

/// Embeds every chunk and assembles an index stamped with the configured embedding version.
pub async fn build_index(
	cfg: &Config,
	embedding: &dyn EmbeddingProvider,
	chunks: &[Chunk],
) -> Result<VectorIndex> {
	let dims = cfg.providers.embedding.dimensions as usize;
	let mut entries = Vec::with_capacity(chunks.len());

	for (batch_idx, batch) in chunks.chunks(EMBED_BATCH_SIZE).enumerate() {
		let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
		let vectors = embedding.embed(&cfg.providers.embedding, &texts).await?;

		if vectors.len() != texts.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} texts.",
					vectors.len(),
					texts.len()
				),
			});
		}
		if vectors.iter().any(|vector| vector.len() != dims) {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		entries.extend(
			texts.into_iter().zip(vectors).map(|(text, vector)| IndexEntry { text, vector }),
		);

		tracing::debug!(batch = batch_idx, embedded = entries.len(), "Embedded chunk batch.");
	}

	Ok(VectorIndex::new(crate::embedding_version(cfg), entries)?)
}
