//! Flat vector index persisted as one JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Result};

pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
	pub text: String,
	pub vector: Vec<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorIndex {
	pub version: u32,
	/// Identifies the embedding model that produced the vectors. Queries must be embedded the
	/// same way.
	pub embedding_version: String,
	pub created_at: String,
	pub digest: String,
	pub entries: Vec<IndexEntry>,
}
impl VectorIndex {
	pub fn new(embedding_version: impl Into<String>, entries: Vec<IndexEntry>) -> Result<Self> {
		if let Some(first) = entries.first() {
			let dims = first.vector.len();

			if dims == 0 || entries.iter().any(|entry| entry.vector.len() != dims) {
				return Err(Error::InvalidIndex(
					"All index vectors must share one non-zero dimension.".to_string(),
				));
			}
		}

		Ok(Self {
			version: INDEX_FORMAT_VERSION,
			embedding_version: embedding_version.into(),
			created_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
			digest: digest(&entries),
			entries,
		})
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn dimensions(&self) -> Option<usize> {
		self.entries.first().map(|entry| entry.vector.len())
	}

	/// Returns at most `top_k` entries with their cosine similarity, highest first.
	pub fn search(&self, query: &[f32], top_k: usize) -> Vec<(&str, f32)> {
		let mut scored: Vec<(&str, f32)> = self
			.entries
			.iter()
			.map(|entry| (entry.text.as_str(), cosine_similarity(query, &entry.vector)))
			.collect();

		scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
		scored.truncate(top_k);

		scored
	}

	pub async fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(parent).await?;
		}

		let tmp = path.with_extension("json.tmp");

		tokio::fs::write(&tmp, serde_json::to_vec(self)?).await?;
		tokio::fs::rename(&tmp, path).await?;

		tracing::info!(path = %path.display(), entries = self.len(), "Saved vector index.");

		Ok(())
	}

	/// Reads a saved index. A missing file is `Ok(None)`: nothing has been indexed yet.
	pub async fn load(path: &Path) -> Result<Option<Self>> {
		let raw = match tokio::fs::read(path).await {
			Ok(raw) => raw,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(err.into()),
		};
		let index: Self = serde_json::from_slice(&raw)?;

		if index.version != INDEX_FORMAT_VERSION {
			return Err(Error::InvalidIndex(format!(
				"Unsupported index version {}, expected {INDEX_FORMAT_VERSION}.",
				index.version
			)));
		}
		if index.digest != digest(&index.entries) {
			return Err(Error::InvalidIndex("Index digest does not match its entries.".to_string()));
		}

		Ok(Some(index))
	}
}

pub fn digest(entries: &[IndexEntry]) -> String {
	let mut hasher = blake3::Hasher::new();

	for entry in entries {
		hasher.update(&(entry.text.len() as u64).to_le_bytes());
		hasher.update(entry.text.as_bytes());
		hasher.update(&(entry.vector.len() as u64).to_le_bytes());

		for value in &entry.vector {
			hasher.update(&value.to_le_bytes());
		}
	}

	hasher.finalize().to_hex().to_string()
}

/// Zero when either side has no magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
	let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
	let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a * norm_b)
}
