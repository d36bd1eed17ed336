//! Gateway route CRUD, path matching, and the gateway-routes enrichment
//! projection.

pub mod glob;

use crate::errors::{AppError, AppResult};
use crate::models::{
    AuthServiceInfo, GatewayRoute, Route, RouteCreate, RouteUpdate, TargetServiceInfo,
};
use crate::store::Store;

/// Validates that `gateway_service_id` names an existing gateway and
/// `target_service_id` names an existing service before inserting.
pub async fn create_route(store: &Store, data: RouteCreate) -> AppResult<Route> {
    let gateway = store
        .get_service(&data.gateway_service_id)
        .await?
        .ok_or_else(|| AppError::not_found("service", &data.gateway_service_id))?;
    if !gateway.is_gateway {
        return Err(AppError::precondition(format!(
            "service '{}' is not a gateway",
            data.gateway_service_id
        )));
    }
    if store.get_service(&data.target_service_id).await?.is_none() {
        return Err(AppError::not_found("service", &data.target_service_id));
    }

    store
        .insert_route(
            &data.gateway_service_id,
            &data.path_pattern,
            &data.methods,
            &data.target_service_id,
            data.strip_prefix,
            data.strip_path.as_deref(),
            data.priority,
            data.enabled,
            data.auth_config.as_ref(),
        )
        .await
}

pub async fn update_route(store: &Store, id: i64, update: RouteUpdate) -> AppResult<Option<Route>> {
    let mut route = match store.get_route(id).await? {
        Some(route) => route,
        None => return Ok(None),
    };

    if let Some(target_service_id) = update.target_service_id {
        if store.get_service(&target_service_id).await?.is_none() {
            return Err(AppError::not_found("service", &target_service_id));
        }
        route.target_service_id = target_service_id;
    }
    if let Some(path_pattern) = update.path_pattern {
        route.path_pattern = path_pattern;
    }
    if let Some(methods) = update.methods {
        route.methods = methods;
    }
    if let Some(strip_prefix) = update.strip_prefix {
        route.strip_prefix = strip_prefix;
    }
    if update.strip_path.is_some() {
        route.strip_path = update.strip_path;
    }
    if let Some(priority) = update.priority {
        route.priority = priority;
    }
    if let Some(enabled) = update.enabled {
        route.enabled = enabled;
    }
    if update.auth_config.is_some() {
        route.auth_config = update.auth_config;
    }

    store.save_route(&route).await?;
    Ok(Some(route))
}

pub async fn delete_route(store: &Store, id: i64) -> AppResult<bool> {
    store.delete_route(id).await
}

pub async fn get_route(store: &Store, id: i64) -> AppResult<Option<Route>> {
    store.get_route(id).await
}

pub async fn get_all_routes(
    store: &Store,
    gateway_id: Option<&str>,
    enabled_only: bool,
) -> AppResult<Vec<Route>> {
    store.list_routes(gateway_id, enabled_only).await
}

/// Highest-priority enabled route from `gateway_id` to `target_service_id`,
/// if any. Used by gateway-routes enrichment to assemble login redirects.
pub async fn find_route_for_service(
    store: &Store,
    gateway_id: &str,
    target_service_id: &str,
) -> AppResult<Option<Route>> {
    let routes = store.list_routes(Some(gateway_id), true).await?;
    Ok(routes
        .into_iter()
        .find(|r| r.target_service_id == target_service_id))
}

/// Finds the highest-priority enabled route whose pattern matches
/// `request_path`, for a given gateway.
pub async fn get_matching_route(
    store: &Store,
    gateway_id: &str,
    request_path: &str,
) -> AppResult<Option<Route>> {
    let routes = store.list_routes(Some(gateway_id), true).await?;
    Ok(routes
        .into_iter()
        .find(|r| glob::matches(&r.path_pattern, request_path)))
}

/// Builds the enriched route list a gateway consumes to do its own
/// forwarding: each route's target service is embedded in full, and any
/// `auth_config` referencing a known authentication service gets an
/// `auth_service` descriptor plus a derived `login_redirect` when the
/// stored config doesn't already supply one.
///
/// `gateway_id` must name an existing, `is_gateway` service — 404/403
/// otherwise.
pub async fn get_gateway_routes(store: &Store, gateway_id: &str) -> AppResult<Vec<GatewayRoute>> {
    let gateway = store
        .get_service(gateway_id)
        .await?
        .ok_or_else(|| AppError::not_found("service", gateway_id))?;
    if !gateway.is_gateway {
        return Err(AppError::forbidden(format!(
            "service '{gateway_id}' is not a gateway"
        )));
    }

    let routes = store.list_routes(Some(gateway_id), true).await?;
    let mut enriched = Vec::with_capacity(routes.len());

    for route in routes {
        let target = match store.get_service(&route.target_service_id).await? {
            Some(target) => target,
            None => continue,
        };

        let target_service = TargetServiceInfo {
            id: target.id.clone(),
            name: target.name.clone(),
            host: target.host.clone(),
            port: target.port,
            protocol: target.protocol,
            status: target.status,
            base_url: target.base_url(),
        };

        let (auth_config, auth_service) = match route.auth_config.clone() {
            Some(mut auth_config) => {
                let resolved = match &auth_config.auth_service_id {
                    Some(auth_service_id) => store.get_service(auth_service_id).await?,
                    None => None,
                };

                let auth_service = match resolved {
                    Some(auth_service) if auth_service.is_authentication_service() => {
                        if auth_config.login_redirect.is_none() {
                            auth_config.login_redirect =
                                derive_login_redirect(store, gateway_id, &auth_service).await?;
                        }
                        Some(AuthServiceInfo {
                            id: auth_service.id.clone(),
                            name: auth_service.name.clone(),
                            base_url: auth_service.base_url(),
                            auth_endpoint: auth_service.auth_endpoint(),
                        })
                    }
                    _ => None,
                };

                (Some(auth_config), auth_service)
            }
            None => (None, None),
        };

        enriched.push(GatewayRoute {
            id: route.id,
            path_pattern: route.path_pattern,
            methods: route.methods,
            target_service_id: route.target_service_id,
            target_service,
            strip_prefix: route.strip_prefix,
            strip_path: route.strip_path,
            priority: route.priority,
            enabled: route.enabled,
            auth_config,
            auth_service,
        });
    }

    Ok(enriched)
}

/// `gateway_prefix + login_path`, where `gateway_prefix` comes from the
/// gateway's own route to the auth service (its `strip_path`, if the route
/// strips a prefix) and falls back to the auth service's absolute base URL
/// when no such route exists.
async fn derive_login_redirect(
    store: &Store,
    gateway_id: &str,
    auth_service: &crate::models::Service,
) -> AppResult<Option<String>> {
    let login_path = match auth_service.login_path() {
        Some(path) => path,
        None => return Ok(None),
    };

    let route_to_auth = find_route_for_service(store, gateway_id, &auth_service.id).await?;

    let redirect = match route_to_auth {
        Some(route) if route.strip_prefix => {
            let prefix = route
                .strip_path
                .unwrap_or_else(|| format!("/{}", auth_service.id));
            format!("{prefix}{login_path}")
        }
        _ => format!("{}{}", auth_service.base_url().trim_end_matches('/'), login_path),
    };

    Ok(Some(redirect))
}
