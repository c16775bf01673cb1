mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chunking, Config, EmbeddingProviderConfig, Index, Providers, RewriteProviderConfig, Search,
	Service, Sqlite, Storage,
};

use std::{env, fs, path::Path};

pub const THRESHOLD_ENV: &str = "DOCENT_SIMILARITY_THRESHOLD";
pub const TOP_K_ENV: &str = "DOCENT_TOP_K";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg = parse(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	apply_overrides(&mut cfg, |name| env::var(name).ok())?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn parse(raw: &str) -> Result<Config, toml::de::Error> {
	toml::from_str(raw)
}

/// Applies process-level overrides once, at load time. Requests never re-read the environment.
pub fn apply_overrides<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(raw) = lookup(THRESHOLD_ENV) {
		cfg.search.threshold = raw.trim().parse().map_err(|_| Error::InvalidOverride {
			name: THRESHOLD_ENV.to_string(),
			value: raw.clone(),
		})?;
	}
	if let Some(raw) = lookup(TOP_K_ENV) {
		cfg.search.top_k = raw
			.trim()
			.parse()
			.map_err(|_| Error::InvalidOverride { name: TOP_K_ENV.to_string(), value: raw.clone() })?;
	}

	Ok(())
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.sqlite.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.sqlite.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.sqlite.path.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "storage.sqlite.path must be non-empty.".to_string(),
		});
	}
	if cfg.index.path.as_os_str().is_empty() {
		return Err(Error::Validation { message: "index.path must be non-empty.".to_string() });
	}
	if !cfg.search.threshold.is_finite() {
		return Err(Error::Validation {
			message: "search.threshold must be a finite number.".to_string(),
		});
	}
	if cfg.search.top_k == 0 {
		return Err(Error::Validation {
			message: "search.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.max_tokens == 0 {
		return Err(Error::Validation {
			message: "chunking.max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("providers.embedding.timeout_ms", cfg.providers.embedding.timeout_ms),
		("providers.rewrite.timeout_ms", cfg.providers.rewrite.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.providers.rewrite.max_attempts == 0 {
		return Err(Error::Validation {
			message: "providers.rewrite.max_attempts must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.rewrite.temperature.is_finite() || cfg.providers.rewrite.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.rewrite.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.rewrite
		.system_prompt
		.as_deref()
		.map(|prompt| prompt.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.rewrite.system_prompt = None;
	}

	cfg.providers.rewrite.api_key = cfg.providers.rewrite.api_key.trim().to_string();
}
