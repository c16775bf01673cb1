pub const CHAT_LOGS_TABLE: &str = "chat_logs";

/// Columns added after the first release. Tables created before them get the columns added in
/// place, with a null default, so historical rows survive.
pub const OPTIONAL_COLUMNS: [(&str, &str); 4] = [
	("score", "REAL"),
	("response_type", "TEXT"),
	("raw_passages", "TEXT"),
	("filtered_out", "TEXT"),
];

pub fn render_schema() -> &'static str {
	include_str!("../../../sql/chat_logs.sql")
}

pub fn statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}

pub fn add_column_sql(column: &str, decl: &str) -> String {
	format!("ALTER TABLE {CHAT_LOGS_TABLE} ADD COLUMN {column} {decl}")
}
