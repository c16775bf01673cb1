use serde::{Deserialize, Serialize};

use docent_domain::{Passage, Ranked, ResponseType, filter_and_rank};
use docent_storage::queries;

use crate::{
	DocentService, Error, InteractionRecord, Result, Retrieval, StoredInteraction, Synthesis,
	synthesis,
};

#[derive(Clone, Debug, Deserialize)]
pub struct AskRequest {
	pub question: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
	pub question: String,
	pub score: f32,
	pub response_type: ResponseType,
	pub raw_passages: Vec<Passage>,
	pub filtered_out: Vec<Passage>,
	pub final_response: String,
}
impl From<InteractionRecord> for AskResponse {
	fn from(record: InteractionRecord) -> Self {
		Self {
			question: record.question,
			score: record.score,
			response_type: record.response_type,
			raw_passages: record.retained,
			filtered_out: record.filtered_out,
			final_response: record.final_response,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugAskResponse {
	#[serde(flatten)]
	pub answer: AskResponse,
	pub threshold: f32,
	pub top_k: u32,
	/// `None` when the record could not be written.
	pub record_id: Option<i64>,
}

impl DocentService {
	/// Answers one question. Every outcome is a normal response; only a blank question is an
	/// error.
	pub async fn ask(&self, req: AskRequest) -> Result<AskResponse> {
		let (record, _) = self.answer(&req.question).await?;

		Ok(record.into())
	}

	pub async fn debug_ask(&self, req: AskRequest) -> Result<DebugAskResponse> {
		let (record, record_id) = self.answer(&req.question).await?;

		Ok(DebugAskResponse {
			answer: record.into(),
			threshold: self.cfg.search.threshold,
			top_k: self.cfg.search.top_k,
			record_id,
		})
	}

	pub async fn latest_interaction(&self, question: &str) -> Result<Option<StoredInteraction>> {
		let log = queries::latest_chat_log_for(&self.db, question).await?;

		Ok(log.map(StoredInteraction::from))
	}

	async fn answer(&self, question: &str) -> Result<(InteractionRecord, Option<i64>)> {
		if question.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "question must be non-empty.".to_string() });
		}

		let search = &self.cfg.search;
		let (ranked, synthesis) = match self.index.search(question, search.top_k).await {
			Ok(Retrieval::NotIndexed) => (Ranked::default(), Synthesis::not_indexed()),
			Ok(Retrieval::Candidates(passages)) if passages.is_empty() =>
				(Ranked::default(), Synthesis::no_information()),
			Ok(Retrieval::Candidates(passages)) => {
				let ranked = filter_and_rank(passages, search.threshold);
				let synthesis = synthesis::synthesize(
					self.providers.rewrite.as_ref(),
					&self.cfg.providers.rewrite,
					question,
					&ranked,
				)
				.await;

				(ranked, synthesis)
			},
			Err(err) => {
				tracing::error!(error = %err, "Search failed.");

				(Ranked::default(), Synthesis::no_information())
			},
		};
		let record = InteractionRecord::new(question, &ranked, synthesis);
		let record_id = match record.persist(&self.db).await {
			Ok(id) => Some(id),
			Err(err) => {
				tracing::error!(error = %err, "Failed to persist interaction.");

				None
			},
		};

		tracing::info!(
			response_type = %record.response_type,
			score = record.score,
			retained = record.retained.len(),
			filtered_out = record.filtered_out.len(),
			record_id,
			"Answered question."
		);

		Ok((record, record_id))
	}
}
