pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Index error: {message}")]
	Index { message: String },
}
impl From<docent_providers::Error> for Error {
	fn from(err: docent_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<docent_storage::Error> for Error {
	fn from(err: docent_storage::Error) -> Self {
		match err {
			docent_storage::Error::InvalidIndex(message) => Self::Index { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
