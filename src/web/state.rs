use std::sync::Arc;

use crate::config::Config;
use crate::health::HealthEngine;
use crate::store::Store;

/// Shared state handed to every handler. Cloning is cheap: `Store` wraps a
/// pooled connection, `HealthEngine` wraps a pooled `reqwest::Client`, and
/// `Config` is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub health: HealthEngine,
}
