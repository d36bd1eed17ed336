use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serviceatlas::config::Config;
use serviceatlas::health::HealthEngine;
use serviceatlas::store::Store;
use serviceatlas::web::WebServer;
use serviceatlas::bootstrap;

#[derive(Parser)]
#[command(name = "serviceatlas")]
#[command(version)]
#[command(about = "A lightweight service registry and discovery hub")]
struct Cli {
    /// Listening host (overrides SERVICEATLAS_HOST / config default)
    #[arg(short = 'H', long, value_name = "HOST")]
    host: Option<String>,

    /// Listening port (overrides SERVICEATLAS_PORT / config default)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides SERVICEATLAS_DATABASE_URL / config default)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Path to the declarative bootstrap document
    #[arg(short = 'c', long, value_name = "PATH")]
    bootstrap_config: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("serviceatlas={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }
    if let Some(bootstrap_config) = cli.bootstrap_config {
        config.bootstrap_config_path = bootstrap_config;
    }
    let config = Arc::new(config);

    info!("starting {} v{}", config.app_name, config.app_version);
    info!("using database: {}", config.database_url);

    let store = Store::connect(&config.database_url).await?;
    info!("store connected, schema ready");

    let report = bootstrap::preload(&store, &config.bootstrap_config_path).await?;
    info!(
        "bootstrap preload: {} services, {} dependencies, {} routes",
        report.services, report.dependencies, report.routes
    );

    if let Some(service) = bootstrap::self_register(&store, &config).await? {
        bootstrap::self_heartbeat(&store, &config).await?;
        info!("self-registered as '{}'", service.id);
    }

    let health = HealthEngine::new(store.clone(), config.clone())?;
    let shutdown = CancellationToken::new();

    let health_handle = {
        let health = health.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { health.run(shutdown).await })
    };

    let web_server = WebServer::new(config.clone(), store, health)?;
    info!("listening on http://{}", web_server.addr());

    tokio::select! {
        result = web_server.serve() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    shutdown.cancel();
    let _ = health_handle.await;

    Ok(())
}
