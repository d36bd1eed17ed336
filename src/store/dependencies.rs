use sqlx::Row;

use super::{parse_timestamp, Store};
use crate::errors::AppResult;
use crate::models::{Dependency, DependencyDirection};

fn row_to_dependency(row: &sqlx::sqlite::SqliteRow) -> AppResult<Dependency> {
    Ok(Dependency {
        id: row.try_get("id")?,
        source_service_id: row.try_get("source_service_id")?,
        target_service_id: row.try_get("target_service_id")?,
        description: row.try_get("description")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
    })
}

impl Store {
    /// Returns the existing row unchanged if the (source, target) pair is
    /// already recorded; declaring a dependency twice is a no-op, not an
    /// error.
    pub async fn create_dependency(
        &self,
        source_service_id: &str,
        target_service_id: &str,
        description: Option<&str>,
    ) -> AppResult<Dependency> {
        if let Some(existing) = sqlx::query(
            "SELECT * FROM dependencies WHERE source_service_id = ? AND target_service_id = ?",
        )
        .bind(source_service_id)
        .bind(target_service_id)
        .fetch_optional(&self.pool)
        .await?
        {
            return row_to_dependency(&existing);
        }

        let created_at = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO dependencies (source_service_id, target_service_id, description, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(source_service_id)
        .bind(target_service_id)
        .bind(description)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM dependencies WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        row_to_dependency(&row)
    }

    pub async fn delete_dependency(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM dependencies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_dependencies(&self) -> AppResult<Vec<Dependency>> {
        let rows = sqlx::query("SELECT * FROM dependencies ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_dependency).collect()
    }

    pub async fn dependencies_for_service(
        &self,
        service_id: &str,
        direction: DependencyDirection,
    ) -> AppResult<Vec<Dependency>> {
        let sql = match direction {
            DependencyDirection::Outgoing => {
                "SELECT * FROM dependencies WHERE source_service_id = ? ORDER BY id ASC"
            }
            DependencyDirection::Incoming => {
                "SELECT * FROM dependencies WHERE target_service_id = ? ORDER BY id ASC"
            }
        };
        let rows = sqlx::query(sql).bind(service_id).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_dependency).collect()
    }
}
