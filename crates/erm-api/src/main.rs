//! ERM Platform server
//!
//! # Usage
//!
//! ```bash
//! erm-server --config erm.toml
//! erm-server --bind 127.0.0.1:9000 --log debug
//! ```

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use erm_api::{router_with_cors, ApiState, AppConfig};
use erm_core::infrastructure::seed::seed_demo;
use erm_core::{ErmServices, RiskStore, ScoringSettings};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "erm-server")]
#[command(version)]
#[command(about = "Enterprise risk management API server", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, short, env = "ERM_CONFIG", default_value = "erm.toml")]
    config: String,

    /// Listen address, overrides the file
    #[arg(long, env = "ERM_BIND")]
    bind: Option<String>,

    /// Log filter, overrides the file
    #[arg(long, env = "ERM_LOG")]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(&cli.config)?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(filter) = cli.log {
        config.logging.filter = filter;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("ERM Platform v{}", env!("CARGO_PKG_VERSION"));
    if !from_file {
        tracing::warn!(path = %cli.config, "Configuration file not found, running on defaults");
    }

    let settings = Arc::new(ScoringSettings::new(config.scoring.clone())?);
    let services = ErmServices::new(Arc::new(RiskStore::new()), settings);
    if config.seed_demo_data {
        let summary = seed_demo(&services)?;
        tracing::info!(
            processes = summary.processes,
            risks = summary.risks,
            controls = summary.controls,
            plans = summary.plans,
            incidents = summary.incidents,
            "Demo register loaded"
        );
    }

    let app = router_with_cors(ApiState::new(services), cors_layer(&config.server.cors_origins)?);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.server.bind))?;
    tracing::info!("API listening on {}", config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>().with_context(|| format!("invalid CORS origin {origin}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any))
}
