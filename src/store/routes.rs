use sqlx::Row;

use super::{get_opt_timestamp, parse_timestamp, Store};
use crate::errors::AppResult;
use crate::models::{AuthConfig, Route};

fn row_to_route(row: &sqlx::sqlite::SqliteRow) -> AppResult<Route> {
    let auth_config: Option<String> = row.try_get("auth_config")?;
    let auth_config = auth_config
        .map(|s| serde_json::from_str::<AuthConfig>(&s))
        .transpose()
        .map_err(crate::errors::AppError::from)?;

    Ok(Route {
        id: row.try_get("id")?,
        gateway_service_id: row.try_get("gateway_service_id")?,
        path_pattern: row.try_get("path_pattern")?,
        methods: row.try_get("methods")?,
        target_service_id: row.try_get("target_service_id")?,
        strip_prefix: row.try_get("strip_prefix")?,
        strip_path: row.try_get("strip_path")?,
        priority: row.try_get("priority")?,
        enabled: row.try_get("enabled")?,
        auth_config,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: get_opt_timestamp(row, "updated_at")?,
    })
}

impl Store {
    pub async fn get_route(&self, id: i64) -> AppResult<Option<Route>> {
        let row = sqlx::query("SELECT * FROM routes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_route).transpose()
    }

    /// Highest priority first, then insertion order, matching the matcher's
    /// first-match-wins semantics.
    pub async fn list_routes(
        &self,
        gateway_id: Option<&str>,
        enabled_only: bool,
    ) -> AppResult<Vec<Route>> {
        let mut sql = "SELECT * FROM routes WHERE 1 = 1".to_string();
        if gateway_id.is_some() {
            sql.push_str(" AND gateway_service_id = ?");
        }
        if enabled_only {
            sql.push_str(" AND enabled = 1");
        }
        sql.push_str(" ORDER BY priority DESC, id DESC");

        let mut query = sqlx::query(&sql);
        if let Some(gateway_id) = gateway_id {
            query = query.bind(gateway_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_route).collect()
    }

    pub async fn routes_targeting(&self, target_service_id: &str) -> AppResult<Vec<Route>> {
        let rows = sqlx::query(
            "SELECT * FROM routes WHERE target_service_id = ? ORDER BY priority DESC, id DESC",
        )
        .bind(target_service_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_route).collect()
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_route(
        &self,
        gateway_service_id: &str,
        path_pattern: &str,
        methods: &str,
        target_service_id: &str,
        strip_prefix: bool,
        strip_path: Option<&str>,
        priority: i64,
        enabled: bool,
        auth_config: Option<&AuthConfig>,
    ) -> AppResult<Route> {
        let auth_config_json = auth_config.map(serde_json::to_string).transpose()?;
        let created_at = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO routes (
                gateway_service_id, path_pattern, methods, target_service_id,
                strip_prefix, strip_path, priority, enabled, auth_config, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(gateway_service_id)
        .bind(path_pattern)
        .bind(methods)
        .bind(target_service_id)
        .bind(strip_prefix)
        .bind(strip_path)
        .bind(priority)
        .bind(enabled)
        .bind(auth_config_json)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM routes WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        row_to_route(&row)
    }

    pub async fn save_route(&self, route: &Route) -> AppResult<()> {
        let auth_config_json = route
            .auth_config
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE routes SET
                path_pattern = ?, methods = ?, target_service_id = ?, strip_prefix = ?,
                strip_path = ?, priority = ?, enabled = ?, auth_config = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&route.path_pattern)
        .bind(&route.methods)
        .bind(&route.target_service_id)
        .bind(route.strip_prefix)
        .bind(&route.strip_path)
        .bind(route.priority)
        .bind(route.enabled)
        .bind(auth_config_json)
        .bind(&updated_at)
        .bind(route.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_route(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM routes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
