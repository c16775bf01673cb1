use serde::{Deserialize, Serialize};

use docent_domain::{Passage, Ranked, ResponseType};
use docent_storage::{db::Db, models::{ChatLog, NewChatLog}, queries};

use crate::{Result, Synthesis};

/// Everything one request produced, ready to append to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
	pub question: String,
	pub final_response: String,
	pub score: f32,
	pub response_type: ResponseType,
	pub retained: Vec<Passage>,
	pub filtered_out: Vec<Passage>,
}
impl InteractionRecord {
	pub fn new(question: &str, ranked: &Ranked, synthesis: Synthesis) -> Self {
		Self {
			question: question.to_string(),
			final_response: synthesis.final_response,
			score: ranked.top_score(),
			response_type: synthesis.response_type,
			retained: ranked.retained.clone(),
			filtered_out: ranked.filtered_out.clone(),
		}
	}

	/// Appends the record and returns the row id.
	pub async fn persist(&self, db: &Db) -> Result<i64> {
		let raw_passages = encode_passages(&self.retained)?;
		let filtered_out = encode_passages(&self.filtered_out)?;
		let log = NewChatLog {
			question: &self.question,
			response: &self.final_response,
			score: self.score,
			response_type: self.response_type.as_str(),
			raw_passages: Some(&raw_passages),
			filtered_out: Some(&filtered_out),
		};

		Ok(queries::insert_chat_log(db, &log).await?)
	}
}

/// A record read back from the log. Fields added after the first release may be absent on older
/// rows, and rows written before the columns were constrained may hold NULL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInteraction {
	pub id: i64,
	pub timestamp: Option<String>,
	pub question: Option<String>,
	pub final_response: Option<String>,
	pub score: Option<f32>,
	pub response_type: Option<ResponseType>,
	pub raw_passages: Option<Vec<Passage>>,
	pub filtered_out: Option<Vec<Passage>>,
}
impl From<ChatLog> for StoredInteraction {
	fn from(log: ChatLog) -> Self {
		let response_type = log.response_type.as_deref().and_then(|raw| match raw.parse() {
			Ok(response_type) => Some(response_type),
			Err(err) => {
				tracing::warn!(id = log.id, error = %err, "Stored response type is not recognized.");

				None
			},
		});

		Self {
			id: log.id,
			raw_passages: decode_passages(log.id, "raw_passages", log.raw_passages.as_deref()),
			filtered_out: decode_passages(log.id, "filtered_out", log.filtered_out.as_deref()),
			timestamp: log.timestamp,
			question: log.question,
			final_response: log.response,
			score: log.score,
			response_type,
		}
	}
}

pub fn encode_passages(passages: &[Passage]) -> Result<String, serde_json::Error> {
	serde_json::to_string(passages)
}

pub fn decode_passages(id: i64, column: &str, raw: Option<&str>) -> Option<Vec<Passage>> {
	let raw = raw?;

	match serde_json::from_str(raw) {
		Ok(passages) => Some(passages),
		Err(err) => {
			tracing::warn!(id, column, error = %err, "Stored passages are not valid JSON.");

			None
		},
	}
}
