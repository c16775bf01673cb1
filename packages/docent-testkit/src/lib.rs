mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use uuid::Uuid;

use docent_config::{
	Chunking, Config, EmbeddingProviderConfig, Index, Providers, RewriteProviderConfig, Search,
	Service, Sqlite, Storage,
};

/// A throwaway directory holding one SQLite database and one index file. Removed on cleanup or
/// drop.
pub struct TestDatabase {
	dir: PathBuf,
	cleaned: bool,
}
impl TestDatabase {
	pub async fn new() -> Result<Self> {
		let dir = env::temp_dir().join(format!("docent_test_{}", Uuid::new_v4().simple()));

		tokio::fs::create_dir_all(&dir)
			.await
			.map_err(|err| Error::Message(format!("Failed to create test directory: {err}.")))?;

		Ok(Self { dir, cleaned: false })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn db_path(&self) -> PathBuf {
		self.dir.join("chat_logs.db")
	}

	pub fn index_path(&self) -> PathBuf {
		self.dir.join("index.json")
	}

	pub fn sqlite_config(&self) -> Sqlite {
		Sqlite { path: self.db_path(), pool_max_conns: 2 }
	}

	/// A complete configuration pointing at this directory. Provider endpoints are unroutable so
	/// nothing leaves the machine unless a test swaps in its own providers.
	pub fn config(&self) -> Config {
		Config {
			service: Service {
				http_bind: "127.0.0.1:0".to_string(),
				log_level: "info".to_string(),
				bind_localhost_only: true,
			},
			storage: Storage { sqlite: self.sqlite_config() },
			index: Index { path: self.index_path() },
			providers: Providers {
				embedding: EmbeddingProviderConfig {
					provider_id: "test".to_string(),
					api_base: "http://127.0.0.1:1".to_string(),
					api_key: "test-key".to_string(),
					path: "/embeddings".to_string(),
					model: "test-embedding".to_string(),
					dimensions: 3,
					timeout_ms: 1_000,
					default_headers: serde_json::Map::new(),
				},
				rewrite: RewriteProviderConfig {
					provider_id: "test".to_string(),
					api_base: "http://127.0.0.1:1".to_string(),
					api_key: "test-key".to_string(),
					path: "/chat/completions".to_string(),
					model: "test-rewrite".to_string(),
					temperature: 0.0,
					max_tokens: 300,
					timeout_ms: 1_000,
					max_attempts: 2,
					system_prompt: None,
					default_headers: serde_json::Map::new(),
				},
			},
			search: Search::default(),
			chunking: Chunking::default(),
		}
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner().await
	}

	async fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		match tokio::fs::remove_dir_all(&self.dir).await {
			Ok(()) => {},
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
			Err(err) => return Err(err.into()),
		}

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}
		if let Err(err) = fs::remove_dir_all(&self.dir)
			&& err.kind() != std::io::ErrorKind::NotFound
		{
			eprintln!("Test directory cleanup failed: {err}.");
		}
	}
}
