use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::Passage;

/// The outcome of thresholding one search result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranked {
	/// Passages with `score >= threshold`, best first. Equal scores keep their input order.
	pub retained: Vec<Passage>,
	/// Every other passage, in input order.
	pub filtered_out: Vec<Passage>,
}
impl Ranked {
	pub fn top_score(&self) -> f32 {
		self.retained.first().map(|passage| passage.score).unwrap_or(0.0)
	}

	pub fn best(&self) -> Option<&Passage> {
		self.retained.first()
	}

	pub fn is_empty(&self) -> bool {
		self.retained.is_empty() && self.filtered_out.is_empty()
	}
}

/// Partitions `passages` by `threshold` (inclusive) and orders the retained side by score.
///
/// No deduplication happens here: identical passages from the search layer are kept as-is.
pub fn filter_and_rank(passages: Vec<Passage>, threshold: f32) -> Ranked {
	let (mut retained, filtered_out): (Vec<_>, Vec<_>) =
		passages.into_iter().partition(|passage| passage.score >= threshold);

	// `sort_by` is stable, which keeps ties in retrieval order.
	retained.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

	Ranked { retained, filtered_out }
}
