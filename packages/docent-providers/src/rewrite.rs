use std::{fmt::Write as _, time::Duration};

use reqwest::Client;
use serde_json::Value;

use docent_config::RewriteProviderConfig;
use docent_domain::Passage;

use crate::{Error, Result};

pub const ANSWER_MARKER: &str = "Answer:";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant for residents, answering from the building's own website and documents. Always speak clearly, stay friendly but focused, and avoid overly general language.";

/// Rewrites retained passages into a conversational answer.
///
/// Transient failures are retried up to `max_attempts` times, each bounded by `timeout_ms`. An
/// attempt that yields no text counts as a failure. The caller sees one logical call: the
/// rewritten text, or an error.
pub async fn rewrite(
	cfg: &RewriteProviderConfig,
	question: &str,
	passages: &[Passage],
) -> Result<String> {
	if cfg.api_key.is_empty() {
		return Err(Error::InvalidConfig {
			message: "Rewrite provider api_key is not configured.".to_string(),
		});
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": build_messages(cfg, question, passages),
	});
	let mut last_error = None;

	for attempt in 1..=cfg.max_attempts {
		let result = async {
			let res = client.post(&url).headers(headers.clone()).json(&body).send().await?;
			let json: Value = res.error_for_status()?.json().await?;

			parse_rewrite_response(&json).ok_or_else(|| Error::InvalidResponse {
				message: "Rewrite response contained no generated text.".to_string(),
			})
		}
		.await;

		match result {
			Ok(answer) => {
				tracing::info!(attempt, "Rewrite succeeded.");

				return Ok(answer);
			},
			Err(err) => {
				tracing::warn!(attempt, max_attempts = cfg.max_attempts, error = %err, "Rewrite attempt failed.");

				last_error = Some(err);
			},
		}
	}

	Err(last_error.unwrap_or_else(|| Error::InvalidResponse {
		message: "Rewrite was not attempted.".to_string(),
	}))
}

pub fn build_messages(
	cfg: &RewriteProviderConfig,
	question: &str,
	passages: &[Passage],
) -> Vec<Value> {
	let system = cfg.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": build_user_prompt(question, passages) }),
	]
}

/// Lists every passage with its rank and score so the model can weigh them, and ends on the
/// answer marker that [`extract_answer`] looks for.
pub fn build_user_prompt(question: &str, passages: &[Passage]) -> String {
	let mut prompt = String::from(
		"Rewrite the following passages into a clear, helpful answer to the resident's question. \
		 Passages with higher scores are more relevant. Ignore passages that do not help answer \
		 the question.\n\n",
	);

	for (idx, passage) in passages.iter().enumerate() {
		let _ = writeln!(prompt, "Passage {} (score {:.3}):\n{}\n", idx + 1, passage.score, passage.text);
	}

	let _ = write!(prompt, "Question: {question}\n\n{ANSWER_MARKER}");

	prompt
}

/// Keeps only the text after the last answer marker, when the model echoes the prompt.
pub fn extract_answer(raw: &str) -> &str {
	match raw.rfind(ANSWER_MARKER) {
		Some(idx) => raw[idx + ANSWER_MARKER.len()..].trim(),
		None => raw.trim(),
	}
}

/// Accepts chat completions, plain completions, and text-generation inference payloads.
fn parse_rewrite_response(json: &Value) -> Option<String> {
	let first_choice = json.get("choices").and_then(|v| v.as_array()).and_then(|arr| arr.first());
	let raw = first_choice
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.or_else(|| first_choice.and_then(|choice| choice.get("text")).and_then(|t| t.as_str()))
		.or_else(|| json.get("generated_text").and_then(|t| t.as_str()))
		.or_else(|| {
			json.as_array()
				.and_then(|arr| arr.first())
				.and_then(|item| item.get("generated_text"))
				.and_then(|t| t.as_str())
		})?;
	let answer = extract_answer(raw);

	(!answer.is_empty()).then(|| answer.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prompt_names_every_passage_with_score() {
		let passages = vec![
			Passage::new("The pool opens at 6am.", 0.85),
			Passage::new("Key fobs are required.", 0.75),
		];
		let prompt = build_user_prompt("What are the pool hours?", &passages);

		assert!(prompt.contains("Passage 1 (score 0.850):\nThe pool opens at 6am."));
		assert!(prompt.contains("Passage 2 (score 0.750):\nKey fobs are required."));
		assert!(prompt.contains("Question: What are the pool hours?"));
		assert!(prompt.ends_with(ANSWER_MARKER));
	}

	#[test]
	fn extract_answer_keeps_text_after_last_marker() {
		let raw = "Question: hours?\n\nAnswer: ignored\nAnswer:  The pool opens at 6am. ";

		assert_eq!(extract_answer(raw), "The pool opens at 6am.");
		assert_eq!(extract_answer("  No marker here. "), "No marker here.");
	}

	#[test]
	fn parses_chat_completion_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "role": "assistant", "content": "Open 6am to 10pm." } }]
		});

		assert_eq!(parse_rewrite_response(&json).as_deref(), Some("Open 6am to 10pm."));
	}

	#[test]
	fn parses_generated_text_array() {
		let json = serde_json::json!([
			{ "generated_text": "Rewrite this...\nAnswer: The gym is on the second floor." }
		]);

		assert_eq!(
			parse_rewrite_response(&json).as_deref(),
			Some("The gym is on the second floor.")
		);
	}

	#[test]
	fn empty_generation_is_not_an_answer() {
		let json = serde_json::json!({ "generated_text": "Prompt echo.\nAnswer:   " });

		assert_eq!(parse_rewrite_response(&json), None);
	}

	#[test]
	fn system_prompt_override_is_used() {
		let cfg = RewriteProviderConfig {
			provider_id: "test".to_string(),
			api_base: "http://127.0.0.1:1".to_string(),
			api_key: "key".to_string(),
			path: "/chat/completions".to_string(),
			model: "m".to_string(),
			temperature: 0.0,
			max_tokens: 300,
			timeout_ms: 1_000,
			max_attempts: 2,
			system_prompt: Some("Answer briefly.".to_string()),
			default_headers: serde_json::Map::new(),
		};
		let messages = build_messages(&cfg, "q", &[]);

		assert_eq!(messages[0]["content"], "Answer briefly.");
		assert_eq!(messages[1]["role"], "user");
	}
}
