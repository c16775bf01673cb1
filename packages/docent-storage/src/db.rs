use std::time::Duration;

use sqlx::{
	SqlitePool,
	sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::{Result, schema};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Db {
	pub pool: SqlitePool,
}
impl Db {
	pub async fn connect(cfg: &docent_config::Sqlite) -> Result<Self> {
		if let Some(parent) = cfg.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(parent).await?;
		}

		let options = SqliteConnectOptions::new()
			.filename(&cfg.path)
			.create_if_missing(true)
			.journal_mode(SqliteJournalMode::Wal)
			.busy_timeout(BUSY_TIMEOUT);
		let pool =
			SqlitePoolOptions::new().max_connections(cfg.pool_max_conns).connect_with(options).await?;

		Ok(Self { pool })
	}

	/// Creates the log table when absent and adds any missing optional column. Safe to run on
	/// every start, against both fresh and legacy databases.
	pub async fn ensure_schema(&self) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		for statement in schema::statements(schema::render_schema()) {
			sqlx::query(statement).execute(&mut *tx).await?;
		}

		let existing: Vec<String> =
			sqlx::query_scalar("SELECT name FROM pragma_table_info('chat_logs')")
				.fetch_all(&mut *tx)
				.await?;

		for (column, decl) in schema::OPTIONAL_COLUMNS {
			if existing.iter().any(|name| name == column) {
				continue;
			}

			let sql = schema::add_column_sql(column, decl);

			sqlx::query(&sql).execute(&mut *tx).await?;

			tracing::info!(column, "Added missing chat_logs column.");
		}

		tx.commit().await?;

		Ok(())
	}
}
