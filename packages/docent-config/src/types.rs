use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub index: Index,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub chunking: Chunking,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_bind_localhost_only")]
	pub bind_localhost_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub sqlite: Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sqlite {
	/// Database file. Created on first connect when missing.
	pub path: PathBuf,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Index {
	/// Location of the persisted vector index written by the indexer.
	pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rewrite: RewriteProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewriteProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Empty means the rewrite service is not configured; every rewrite attempt then fails fast.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_rewrite_max_tokens")]
	pub max_tokens: u32,
	#[serde(default = "default_rewrite_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_rewrite_max_attempts")]
	pub max_attempts: u32,
	pub system_prompt: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Minimum similarity a passage needs to be retained. Backend dependent, not a probability.
	pub threshold: f32,
	pub top_k: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { threshold: 0.3, top_k: 3 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Chunking {
	/// Word budget per chunk.
	pub max_tokens: u32,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { max_tokens: 512 }
	}
}

fn default_bind_localhost_only() -> bool {
	true
}

fn default_rewrite_max_tokens() -> u32 {
	300
}

fn default_rewrite_timeout_ms() -> u64 {
	15_000
}

fn default_rewrite_max_attempts() -> u32 {
	2
}
