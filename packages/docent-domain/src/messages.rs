pub const NO_DOCUMENTS_INDEXED: &str = "No documents indexed yet.";
pub const NO_INFORMATION_FOUND: &str = "No information found for this question.";

/// The operator-facing message shown when nothing clears the threshold. It quotes the question
/// verbatim so coverage gaps can be traced back from the logs.
pub fn fallback_message(question: &str) -> String {
	format!(
		"No strong match found in index. Query: '{question}'. Consider checking content coverage or reindexing."
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fallback_quotes_question_verbatim() {
		let question = "Is the 'roof deck' open after 10pm?";
		let message = fallback_message(question);

		assert!(message.contains(question));
		assert!(message.starts_with("No strong match found in index."));
	}
}
