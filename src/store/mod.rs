//! Persistence layer.
//!
//! `Store` wraps a `sqlx` pool and owns schema creation and all CRUD SQL.
//! It is the only place that touches the database; everything above it
//! (registry, health, dependency, route, discovery) talks to `Store`, never
//! to `sqlx` directly. Rows are mapped by hand rather than via
//! `#[derive(FromRow)]` because `service_meta`/`auth_config` are stored as
//! JSON text and need decoding on the way out.

mod dependencies;
mod routes;
mod services;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" && !path.is_empty() {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            AppError::internal(format!("failed to create database directory: {e}"))
                        })?;
                    }
                }
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                host TEXT NOT NULL,
                port INTEGER NOT NULL,
                protocol TEXT NOT NULL DEFAULT 'http',
                health_check_path TEXT NOT NULL DEFAULT '/health',
                status TEXT NOT NULL DEFAULT 'unknown',
                is_gateway INTEGER NOT NULL DEFAULT 0,
                base_path TEXT,
                service_meta TEXT,
                registered_at TEXT NOT NULL,
                last_heartbeat TEXT,
                consecutive_failures INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dependencies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_service_id TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
                target_service_id TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
                description TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS routes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                gateway_service_id TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
                path_pattern TEXT NOT NULL,
                methods TEXT NOT NULL DEFAULT '*',
                target_service_id TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
                strip_prefix INTEGER NOT NULL DEFAULT 0,
                strip_path TEXT,
                priority INTEGER NOT NULL DEFAULT 0,
                enabled INTEGER NOT NULL DEFAULT 1,
                auth_config TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // sqlite enforces FK cascade only when pragma foreign_keys is on,
        // and it's a per-connection setting so it must be set on every
        // checkout, not just once at startup.
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// An in-memory store, for tests and for `--database-url sqlite::memory:`.
    pub async fn in_memory() -> AppResult<Self> {
        Self::connect("sqlite::memory:").await
    }
}

/// Parses a timestamp stored in RFC 3339 form, the only format this store
/// ever writes.
fn parse_timestamp(s: &str) -> AppResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| AppError::internal(format!("corrupt timestamp '{s}': {e}")))
}

fn get_opt_timestamp(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
    row.try_get::<Option<String>, _>(column)
        .map_err(AppError::from)?
        .map(|s| parse_timestamp(&s))
        .transpose()
}

fn get_opt_json(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> AppResult<Option<serde_json::Value>> {
    row.try_get::<Option<String>, _>(column)
        .map_err(AppError::from)?
        .map(|s| serde_json::from_str(&s).map_err(AppError::from))
        .transpose()
}
