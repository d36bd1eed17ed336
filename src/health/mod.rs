//! Health engine: three cooperating background jobs that race benignly
//! against request-driven writes (last writer wins, per-row).
//!
//! - **Active probe**: GETs each service's health endpoint on a fixed tick,
//!   tracks consecutive failures, flips to `unhealthy` past the threshold.
//! - **Heartbeat sweep**: marks services whose `last_heartbeat` has aged
//!   past `heartbeat_timeout` as `unhealthy`, independent of probing.
//! - **Self-heartbeat**: keeps this process's own self-registered service
//!   row alive, in-process, without looping a probe back over HTTP. Runs on
//!   a fixed 30s period, independent of `heartbeat_timeout`.
//!
//! Grounded in the teacher's scheduler: a `tokio::select!` over interval
//! ticks plus a cancellation signal, rather than three independent
//! `tokio::spawn`ed loops with no coordinated shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{Service, ServiceStatus};
use crate::registry;
use crate::store::Store;

/// Fixed period for the self-heartbeat job, independent of `heartbeat_timeout`.
const SELF_HEARTBEAT_PERIOD_SECS: u64 = 30;

#[derive(Clone)]
pub struct HealthEngine {
    store: Store,
    client: reqwest::Client,
    config: Arc<Config>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProbeSummary {
    pub checked: usize,
    pub healthy: usize,
    pub unhealthy: usize,
}

impl HealthEngine {
    pub fn new(store: Store, config: Arc<Config>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.health_check_timeout))
            .build()
            .map_err(|e| crate::errors::AppError::internal(format!("failed to build http client: {e}")))?;

        Ok(Self { store, client, config })
    }

    /// Runs all three jobs until `shutdown` is cancelled. Intended to be
    /// spawned once at process start and joined during graceful shutdown.
    pub async fn run(self, shutdown: CancellationToken) {
        let probe_interval = Duration::from_secs(self.config.health_check_interval);
        let sweep_interval = Duration::from_secs(self.config.health_check_interval);
        let self_heartbeat_interval = Duration::from_secs(SELF_HEARTBEAT_PERIOD_SECS);

        let mut probe_tick = tokio::time::interval(probe_interval);
        let mut sweep_tick = tokio::time::interval(sweep_interval);
        let mut self_heartbeat_tick = tokio::time::interval(self_heartbeat_interval);

        info!("health engine started (interval={}s, heartbeat_timeout={}s)",
            self.config.health_check_interval, self.config.heartbeat_timeout);

        loop {
            tokio::select! {
                _ = probe_tick.tick() => {
                    if let Err(e) = self.run_active_probe().await {
                        warn!("active probe pass failed: {}", e);
                    }
                }
                _ = sweep_tick.tick() => {
                    if let Err(e) = self.run_heartbeat_sweep().await {
                        warn!("heartbeat sweep failed: {}", e);
                    }
                }
                _ = self_heartbeat_tick.tick(), if self.config.self_register => {
                    if let Err(e) = registry::heartbeat(&self.store, &self.config.service_id).await {
                        warn!("self-heartbeat failed: {}", e);
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("health engine shutting down");
                    break;
                }
            }
        }
    }

    /// Probes every registered service once. Each probe is independent;
    /// one failing probe never aborts the pass.
    async fn run_active_probe(&self) -> AppResult<ProbeSummary> {
        let services = self.store.list_services(None, None).await?;
        let mut summary = ProbeSummary::default();

        for service in services {
            let is_healthy = self.probe(&service).await;
            summary.checked += 1;
            if is_healthy {
                summary.healthy += 1;
            } else {
                summary.unhealthy += 1;
            }
            self.apply_probe_result(service, is_healthy).await?;
        }

        debug!("active probe: checked={} healthy={}", summary.checked, summary.healthy);
        Ok(summary)
    }

    /// Runs one full probe pass on demand, outside the regular schedule.
    /// Backs `POST /monitor/health-check`.
    pub async fn trigger_full_probe(&self) -> AppResult<ProbeSummary> {
        self.run_active_probe().await
    }

    async fn probe(&self, service: &Service) -> bool {
        match self.client.get(service.health_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Applies one probe outcome to a service's failure counter and status.
    /// `pub` so tests can drive the threshold transition directly, without
    /// standing up an HTTP endpoint for the probe to hit.
    pub async fn apply_probe_result(&self, mut service: Service, is_healthy: bool) -> AppResult<()> {
        if is_healthy {
            service.status = ServiceStatus::Healthy;
            service.consecutive_failures = 0;
        } else {
            service.consecutive_failures += 1;
            if service.consecutive_failures >= self.config.unhealthy_threshold as i64 {
                service.status = ServiceStatus::Unhealthy;
            }
        }
        self.store.save_service(&service).await
    }

    /// Marks services whose heartbeat has aged past the configured timeout
    /// as unhealthy. Independent of the active probe: a service that never
    /// exposes a health endpoint but stops heartbeating is still caught.
    pub async fn run_heartbeat_sweep(&self) -> AppResult<()> {
        let threshold = chrono::Utc::now() - chrono::Duration::seconds(self.config.heartbeat_timeout as i64);
        let services = self.store.list_services(None, None).await?;
        let mut marked = 0usize;

        for mut service in services {
            let stale = match service.last_heartbeat {
                Some(last) => last < threshold,
                None => service.registered_at < threshold,
            };
            if stale && service.status != ServiceStatus::Unhealthy {
                service.status = ServiceStatus::Unhealthy;
                self.store.save_service(&service).await?;
                marked += 1;
            }
        }

        if marked > 0 {
            debug!("heartbeat sweep: marked {} services unhealthy", marked);
        }
        Ok(())
    }
}
