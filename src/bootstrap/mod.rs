//! One-shot startup bootstrap: declarative preload from `services.yaml`,
//! followed by self-registration of this process as a service.
//!
//! Per-entry preload failures are logged and skipped; a broken bootstrap
//! document never prevents the server from starting.

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{BootstrapDocument, DependencyCreate, RouteCreate, Service, ServiceCreate};
use crate::store::Store;
use crate::{dependency, registry, route};

#[derive(Debug, Default)]
pub struct PreloadReport {
    pub services: usize,
    pub dependencies: usize,
    pub routes: usize,
}

/// Loads `path`, if it exists, and applies each declared service,
/// dependency and route to the store. A missing file is not an error —
/// bootstrap is optional.
pub async fn preload(store: &Store, path: &str) -> AppResult<PreloadReport> {
    let document = match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<BootstrapDocument>(&contents) {
            Ok(document) => document,
            Err(e) => {
                warn!("failed to parse bootstrap document '{}': {}", path, e);
                return Ok(PreloadReport::default());
            }
        },
        Err(_) => {
            info!("no bootstrap document at '{}', skipping preload", path);
            return Ok(PreloadReport::default());
        }
    };

    let mut report = PreloadReport::default();

    for svc in document.services {
        let data = ServiceCreate {
            id: svc.id.clone(),
            name: svc.name,
            host: svc.host,
            port: svc.port,
            protocol: svc.protocol,
            health_check_path: svc.health_check_path,
            is_gateway: svc.is_gateway,
            base_path: None,
            service_meta: svc.metadata,
        };
        match registry::register_service(store, data).await {
            Ok(_) => report.services += 1,
            Err(e) => warn!(
                "failed to preregister service '{}': {}",
                svc.id.unwrap_or_else(|| "?".to_string()),
                e
            ),
        }
    }

    for dep in document.dependencies {
        let data = DependencyCreate {
            source_service_id: dep.source,
            target_service_id: dep.target,
            description: dep.description,
        };
        match dependency::create_dependency(store, data).await {
            Ok(_) => report.dependencies += 1,
            Err(e) => warn!("failed to precreate dependency: {}", e),
        }
    }

    for r in document.routes {
        let data = RouteCreate {
            gateway_service_id: r.gateway,
            path_pattern: r.path_pattern,
            methods: "*".to_string(),
            target_service_id: r.target,
            strip_prefix: r.strip_prefix,
            strip_path: r.strip_path,
            priority: r.priority,
            enabled: true,
            auth_config: r.auth_config,
        };
        match route::create_route(store, data).await {
            Ok(_) => report.routes += 1,
            Err(e) => warn!("failed to precreate route: {}", e),
        }
    }

    if report.services > 0 || report.dependencies > 0 || report.routes > 0 {
        info!(
            "preload complete: {} services, {} dependencies, {} routes",
            report.services, report.dependencies, report.routes
        );
    }

    Ok(report)
}

/// Registers this process itself as a (non-gateway) service, carrying an
/// `auth_config` in `service_meta` that a gateway picks up through the
/// normal enrichment path — ServiceAtlas is just another service from the
/// gateway's point of view.
pub async fn self_register(store: &Store, config: &Config) -> AppResult<Option<Service>> {
    if !config.self_register {
        return Ok(None);
    }

    let service_meta = serde_json::json!({
        "version": config.app_version,
        "description": "service registry and discovery hub",
        "auth_config": {
            "require_auth": true,
            "auth_service_id": "aegis",
            "public_paths": ["/health", "/docs", "/redoc", "/openapi.json"],
        },
    });

    let data = ServiceCreate {
        id: Some(config.service_id.clone()),
        name: format!("{} registry", config.app_name),
        host: config.host.clone(),
        port: config.port,
        protocol: None,
        health_check_path: Some("/health".to_string()),
        is_gateway: Some(false),
        base_path: config.base_path.clone(),
        service_meta: Some(service_meta),
    };

    let service = registry::register_service(store, data).await?;
    info!(
        "self-registered as '{}' (base_path: {})",
        service.id,
        config.base_path.as_deref().unwrap_or("none")
    );
    Ok(Some(service))
}

/// Marks this process's own row healthy immediately after self-registration,
/// so it doesn't read as `unknown` until the first health-engine tick.
pub async fn self_heartbeat(store: &Store, config: &Config) -> AppResult<()> {
    if !config.self_register {
        return Ok(());
    }
    registry::heartbeat(store, &config.service_id).await?;
    Ok(())
}
