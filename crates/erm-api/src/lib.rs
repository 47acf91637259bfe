//! ERM Platform API
//!
//! REST surface over the risk register and the scoring engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         REST API (/api/v1)                       │
//! │   processes | organization | risks | plans | incidents | ...     │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼─────────────────────────────────┐
//! │                     ErmServices (erm-core)                       │
//! │   transactional store  ◀──  evaluations / controls rescoring     │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼─────────────────────────────────┐
//! │                     ScoringEngine (erm-scoring)                  │
//! │   impact averaging | bands | effectiveness | residual | grid     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod routes;

use axum::{routing::get, Json, Router};
use erm_core::ErmServices;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use config::AppConfig;
pub use error::ApiError;
pub use models::*;

/// API state
pub struct ApiState {
    pub services: ErmServices,
    /// API version
    pub version: String,
}

impl ApiState {
    pub fn new(services: ErmServices) -> Self {
        Self { services, version: env!("CARGO_PKG_VERSION").to_string() }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ERM Platform API",
        description = "Enterprise risk management: process risk register, evaluations, controls and heat maps",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::scoring::classify,
        routes::scoring::grid,
        routes::scoring::effectiveness,
        routes::processes::list_processes,
        routes::processes::get_process,
        routes::risks::list_risks,
        routes::risks::get_risk,
        routes::risks::create_risk,
        routes::risks::risk_statistics,
        routes::risks::risk_map,
        routes::risks::evaluate_risk,
        routes::risks::create_risk_control,
        routes::plans::overdue_plans,
        routes::incidents::incidents_by_period,
        routes::catalogs::get_scoring_config,
        routes::catalogs::replace_scoring_config,
        routes::utilities::process_history,
    ),
    components(
        schemas(
            ErrorResponse, Affected,
            ClassifyRequest, ClassifyResponse,
            GridRequest, GridResponse,
            EffectivenessResponse,
            routes::health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoring", description = "Stateless scoring engine"),
        (name = "processes", description = "Process catalog and analysis"),
        (name = "risks", description = "Risk register, evaluations and controls"),
        (name = "plans", description = "Action plans"),
        (name = "incidents", description = "Materialized risk events"),
        (name = "catalogs", description = "Reference catalogs and scoring configuration"),
        (name = "utilities", description = "Observations, process history, tasks and notifications")
    )
)]
pub struct ApiDoc;

/// Build the API router with permissive CORS
pub fn build_router(state: ApiState) -> Router {
    router_with_cors(state, CorsLayer::permissive())
}

/// Build the API router with the given CORS policy
pub fn router_with_cors(state: ApiState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", api_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<ApiState>> {
    Router::new()
        // Process catalog
        .nest("/processes", routes::processes::router())
        // Organization
        .nest("/areas", routes::organization::areas())
        .nest("/managements", routes::organization::managements())
        .nest("/positions", routes::organization::positions())
        .nest("/users", routes::organization::users())
        // Risk register
        .nest("/risks", routes::risks::router())
        .nest("/evaluations", routes::evaluations::router())
        .nest("/causes", routes::causes::router())
        .nest("/controls", routes::controls::router())
        .nest("/priorities", routes::priorities::router())
        // Treatment and events
        .nest("/plans", routes::plans::router())
        .nest("/incidents", routes::incidents::router())
        // Reference data and engine
        .nest("/catalogs", routes::catalogs::router())
        .nest("/scoring", routes::scoring::router())
        // Working records
        .nest("/utilities", routes::utilities::router())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
