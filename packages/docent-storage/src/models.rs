/// One persisted interaction. Every column but `id` is optional: later columns are NULL on rows
/// written before them, and the first schema left the text columns nullable.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatLog {
	pub id: i64,
	pub timestamp: Option<String>,
	pub question: Option<String>,
	pub response: Option<String>,
	pub score: Option<f32>,
	pub response_type: Option<String>,
	pub raw_passages: Option<String>,
	pub filtered_out: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewChatLog<'a> {
	pub question: &'a str,
	pub response: &'a str,
	pub score: f32,
	pub response_type: &'a str,
	pub raw_passages: Option<&'a str>,
	pub filtered_out: Option<&'a str>,
}
