//! Core data model: services, dependencies, routes, and the two derived
//! views (topology, gateway routes). Mirrors the entity list in the data
//! model specification — one persistent struct per table, plus thin
//! request DTOs for partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service health as tracked by the registry. Distinct from HTTP reachability
/// of the registry itself — this is the *target* service's liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Unknown,
    Healthy,
    Unhealthy,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Unhealthy => "unhealthy",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "healthy" => ServiceStatus::Healthy,
            "unhealthy" => ServiceStatus::Unhealthy,
            _ => ServiceStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "https" => Protocol::Https,
            _ => Protocol::Http,
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Http
    }
}

/// A registered service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub health_check_path: String,
    pub status: ServiceStatus,
    pub is_gateway: bool,
    pub base_path: Option<String>,
    pub service_meta: Option<serde_json::Value>,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub consecutive_failures: i64,
}

impl Service {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol.as_str(), self.host, self.port)
    }

    pub fn health_url(&self) -> String {
        let path = if self.health_check_path.starts_with('/') {
            self.health_check_path.clone()
        } else {
            format!("/{}", self.health_check_path)
        };
        format!("{}{}", self.base_url(), path)
    }

    /// `service_meta.service_type == "authentication"`.
    pub fn is_authentication_service(&self) -> bool {
        self.service_meta
            .as_ref()
            .and_then(|m| m.get("service_type"))
            .and_then(|v| v.as_str())
            == Some("authentication")
    }

    pub fn login_path(&self) -> Option<String> {
        self.service_meta
            .as_ref()
            .and_then(|m| m.get("login_path"))
            .and_then(|v| v.as_str())
            .map(|p| {
                if p.starts_with('/') {
                    p.to_string()
                } else {
                    format!("/{p}")
                }
            })
    }

    pub fn auth_endpoint(&self) -> Option<String> {
        self.service_meta
            .as_ref()
            .and_then(|m| m.get("auth_endpoint"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Input payload for registration (`POST /services`) and bootstrap preload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceCreate {
    pub id: Option<String>,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub protocol: Option<Protocol>,
    pub health_check_path: Option<String>,
    pub is_gateway: Option<bool>,
    pub base_path: Option<String>,
    pub service_meta: Option<serde_json::Value>,
}

/// Partial update (`PUT /services/{id}`). Every field is optional; absent
/// fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<Protocol>,
    pub health_check_path: Option<String>,
    pub is_gateway: Option<bool>,
    pub base_path: Option<String>,
    pub service_meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceListQuery {
    pub status: Option<String>,
    pub is_gateway: Option<bool>,
}

/// Directed edge between two services, used only for the topology view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub id: i64,
    pub source_service_id: String,
    pub target_service_id: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencyCreate {
    pub source_service_id: String,
    pub target_service_id: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyDirection {
    Outgoing,
    Incoming,
}

/// Authentication configuration attached to a route. Stored verbatim as the
/// route's `auth_config` JSON column; only the gateway-routes projection
/// interprets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub require_auth: bool,
    pub auth_service_id: Option<String>,
    #[serde(default)]
    pub public_paths: Vec<String>,
    pub login_redirect: Option<String>,
}

/// A pattern-to-target forwarding rule owned by a gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub gateway_service_id: String,
    pub path_pattern: String,
    pub methods: String,
    pub target_service_id: String,
    pub strip_prefix: bool,
    pub strip_path: Option<String>,
    pub priority: i64,
    pub enabled: bool,
    pub auth_config: Option<AuthConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteCreate {
    pub gateway_service_id: String,
    pub path_pattern: String,
    #[serde(default = "default_methods")]
    pub methods: String,
    pub target_service_id: String,
    #[serde(default)]
    pub strip_prefix: bool,
    pub strip_path: Option<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub auth_config: Option<AuthConfig>,
}

fn default_methods() -> String {
    "*".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteUpdate {
    pub path_pattern: Option<String>,
    pub methods: Option<String>,
    pub target_service_id: Option<String>,
    pub strip_prefix: Option<bool>,
    pub strip_path: Option<String>,
    pub priority: Option<i64>,
    pub enabled: Option<bool>,
    pub auth_config: Option<AuthConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteListQuery {
    pub gateway_id: Option<String>,
    #[serde(default)]
    pub enabled_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopologyNode {
    pub id: String,
    pub name: String,
    pub status: ServiceStatus,
    pub is_gateway: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopologyEdge {
    pub source: String,
    pub target: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<TopologyEdge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetServiceInfo {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub status: ServiceStatus,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthServiceInfo {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub auth_endpoint: Option<String>,
}

/// Route enriched with resolved target/auth service data. The only place
/// auth metadata is materialized; produced fresh on every call, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRoute {
    pub id: i64,
    pub path_pattern: String,
    pub methods: String,
    pub target_service_id: String,
    pub target_service: TargetServiceInfo,
    pub strip_prefix: bool,
    pub strip_path: Option<String>,
    pub priority: i64,
    pub enabled: bool,
    pub auth_config: Option<AuthConfig>,
    pub auth_service: Option<AuthServiceInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub total: i64,
    pub healthy: i64,
    pub unhealthy: i64,
    pub unknown: i64,
    pub gateways: i64,
}

/// Declarative bootstrap document (`services.yaml`).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BootstrapDocument {
    #[serde(default)]
    pub services: Vec<BootstrapService>,
    #[serde(default)]
    pub dependencies: Vec<BootstrapDependency>,
    #[serde(default)]
    pub routes: Vec<BootstrapRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapService {
    pub id: Option<String>,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub protocol: Option<Protocol>,
    pub health_check_path: Option<String>,
    pub is_gateway: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapDependency {
    pub source: String,
    pub target: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapRoute {
    pub gateway: String,
    pub path_pattern: String,
    pub target: String,
    #[serde(default)]
    pub strip_prefix: bool,
    pub strip_path: Option<String>,
    #[serde(default)]
    pub priority: i64,
    pub auth_config: Option<AuthConfig>,
}
