use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
	Result,
	db::Db,
	models::{ChatLog, NewChatLog},
};

const CHAT_LOG_COLUMNS: &str =
	"id, timestamp, question, response, score, response_type, raw_passages, filtered_out";

/// Appends one row and returns its id. The timestamp is assigned here, never by the caller.
pub async fn insert_chat_log(db: &Db, log: &NewChatLog<'_>) -> Result<i64> {
	let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;
	let result = sqlx::query(
		"\
INSERT INTO chat_logs (timestamp, question, response, score, response_type, raw_passages, filtered_out)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
	)
	.bind(timestamp)
	.bind(log.question)
	.bind(log.response)
	.bind(log.score)
	.bind(log.response_type)
	.bind(log.raw_passages)
	.bind(log.filtered_out)
	.execute(&db.pool)
	.await?;

	Ok(result.last_insert_rowid())
}

pub async fn latest_chat_log_for(db: &Db, question: &str) -> Result<Option<ChatLog>> {
	let sql = format!(
		"SELECT {CHAT_LOG_COLUMNS} FROM chat_logs WHERE question = ?1 ORDER BY id DESC LIMIT 1"
	);
	let row = sqlx::query_as::<_, ChatLog>(&sql).bind(question).fetch_optional(&db.pool).await?;

	Ok(row)
}

/// Newest first.
pub async fn recent_chat_logs(db: &Db, limit: u32) -> Result<Vec<ChatLog>> {
	let sql = format!("SELECT {CHAT_LOG_COLUMNS} FROM chat_logs ORDER BY id DESC LIMIT ?1");
	let rows =
		sqlx::query_as::<_, ChatLog>(&sql).bind(i64::from(limit)).fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn count_chat_logs(db: &Db) -> Result<i64> {
	let count = sqlx::query_scalar("SELECT COUNT(*) FROM chat_logs").fetch_one(&db.pool).await?;

	Ok(count)
}
