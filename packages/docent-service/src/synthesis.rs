use std::time::Duration;

use docent_config::RewriteProviderConfig;
use docent_domain::{Ranked, ResponseType, messages};

use crate::RewriteProvider;

/// The answer chosen for one request, before it is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
	pub final_response: String,
	pub response_type: ResponseType,
}
impl Synthesis {
	pub fn not_indexed() -> Self {
		Self::error(messages::NO_DOCUMENTS_INDEXED)
	}

	pub fn no_information() -> Self {
		Self::error(messages::NO_INFORMATION_FOUND)
	}

	pub fn fallback(question: &str) -> Self {
		Self {
			final_response: messages::fallback_message(question),
			response_type: ResponseType::Fallback,
		}
	}

	fn error(message: &str) -> Self {
		Self { final_response: message.to_string(), response_type: ResponseType::Error }
	}
}

/// Picks the answer for passages that reached ranking.
///
/// The rewrite provider is called at most once, bounded by the provider's whole retry budget. Any
/// failure, timeout, or blank output falls back to the best retained passage verbatim.
pub async fn synthesize(
	rewriter: &dyn RewriteProvider,
	cfg: &RewriteProviderConfig,
	question: &str,
	ranked: &Ranked,
) -> Synthesis {
	let Some(best) = ranked.best() else {
		return Synthesis::fallback(question);
	};
	let deadline = rewrite_deadline(cfg);

	match tokio::time::timeout(deadline, rewriter.rewrite(cfg, question, &ranked.retained)).await {
		Ok(Ok(text)) if !text.trim().is_empty() => Synthesis {
			final_response: text.trim().to_string(),
			response_type: ResponseType::Rewrite,
		},
		Ok(Ok(_)) => {
			tracing::warn!("Rewrite returned blank text. Answering with the best passage.");

			direct(best.text.clone())
		},
		Ok(Err(err)) => {
			tracing::warn!(error = %err, "Rewrite failed. Answering with the best passage.");

			direct(best.text.clone())
		},
		Err(_) => {
			tracing::warn!(
				deadline_ms = deadline.as_millis() as u64,
				"Rewrite timed out. Answering with the best passage."
			);

			direct(best.text.clone())
		},
	}
}

pub fn rewrite_deadline(cfg: &RewriteProviderConfig) -> Duration {
	Duration::from_millis(cfg.timeout_ms.saturating_mul(u64::from(cfg.max_attempts.max(1))))
}

fn direct(text: String) -> Synthesis {
	Synthesis { final_response: text, response_type: ResponseType::Direct }
}
