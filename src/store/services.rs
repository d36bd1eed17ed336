use sqlx::Row;

use super::{get_opt_json, get_opt_timestamp, parse_timestamp, Store};
use crate::errors::AppResult;
use crate::models::{Protocol, Service, ServiceStatus};

fn row_to_service(row: &sqlx::sqlite::SqliteRow) -> AppResult<Service> {
    Ok(Service {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        host: row.try_get("host")?,
        port: row.try_get::<i64, _>("port")? as u16,
        protocol: Protocol::parse(row.try_get::<String, _>("protocol")?.as_str()),
        health_check_path: row.try_get("health_check_path")?,
        status: ServiceStatus::parse(row.try_get::<String, _>("status")?.as_str()),
        is_gateway: row.try_get("is_gateway")?,
        base_path: row.try_get("base_path")?,
        service_meta: get_opt_json(row, "service_meta")?,
        registered_at: parse_timestamp(&row.try_get::<String, _>("registered_at")?)?,
        last_heartbeat: get_opt_timestamp(row, "last_heartbeat")?,
        consecutive_failures: row.try_get("consecutive_failures")?,
    })
}

impl Store {
    pub async fn get_service(&self, id: &str) -> AppResult<Option<Service>> {
        let row = sqlx::query("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_service).transpose()
    }

    /// Newest-registered-first, per the default read order in the spec.
    pub async fn list_services(
        &self,
        status: Option<ServiceStatus>,
        is_gateway: Option<bool>,
    ) -> AppResult<Vec<Service>> {
        let mut sql = "SELECT * FROM services WHERE 1 = 1".to_string();
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if is_gateway.is_some() {
            sql.push_str(" AND is_gateway = ?");
        }
        sql.push_str(" ORDER BY registered_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        if let Some(is_gateway) = is_gateway {
            query = query.bind(is_gateway);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_service).collect()
    }

    /// All gateway services, ordered lexicographically by id. Used both by
    /// `GET /gateways` and by the default-route injector's deterministic
    /// tie-break.
    pub async fn list_gateways_ordered(&self) -> AppResult<Vec<Service>> {
        let rows = sqlx::query("SELECT * FROM services WHERE is_gateway = 1 ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_service).collect()
    }

    pub async fn insert_service(&self, service: &Service) -> AppResult<()> {
        let meta = service
            .service_meta
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, host, port, protocol, health_check_path, status,
                is_gateway, base_path, service_meta, registered_at,
                last_heartbeat, consecutive_failures
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&service.id)
        .bind(&service.name)
        .bind(&service.host)
        .bind(service.port as i64)
        .bind(service.protocol.as_str())
        .bind(&service.health_check_path)
        .bind(service.status.as_str())
        .bind(service.is_gateway)
        .bind(&service.base_path)
        .bind(meta)
        .bind(service.registered_at.to_rfc3339())
        .bind(service.last_heartbeat.map(|t| t.to_rfc3339()))
        .bind(service.consecutive_failures)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces every mutable column of an existing service row. Callers
    /// (registry re-register, update, heartbeat, health engine) build the
    /// full updated `Service` in memory and hand it back here; this keeps
    /// each write a single linearizable statement.
    pub async fn save_service(&self, service: &Service) -> AppResult<()> {
        let meta = service
            .service_meta
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            UPDATE services SET
                name = ?, host = ?, port = ?, protocol = ?, health_check_path = ?,
                status = ?, is_gateway = ?, base_path = ?, service_meta = ?,
                last_heartbeat = ?, consecutive_failures = ?
            WHERE id = ?
            "#,
        )
        .bind(&service.name)
        .bind(&service.host)
        .bind(service.port as i64)
        .bind(service.protocol.as_str())
        .bind(&service.health_check_path)
        .bind(service.status.as_str())
        .bind(service.is_gateway)
        .bind(&service.base_path)
        .bind(meta)
        .bind(service.last_heartbeat.map(|t| t.to_rfc3339()))
        .bind(service.consecutive_failures)
        .bind(&service.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_service(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn service_stats(&self) -> AppResult<(i64, i64, i64, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        let healthy: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE status = 'healthy'")
            .fetch_one(&self.pool)
            .await?;
        let unhealthy: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE status = 'unhealthy'")
                .fetch_one(&self.pool)
                .await?;
        let gateways: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE is_gateway = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok((total, healthy, unhealthy, gateways))
    }
}
