//! API handlers for Visitreg REST endpoints

pub mod backup;
pub mod health;
pub mod openapi;
pub mod scan;
pub mod visits;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Visits
        .route("/visits", get(visits::list_visits).post(visits::create_visit))
        .route("/visits/purge/:range", delete(visits::purge_visits))
        .route(
            "/visits/:id",
            get(visits::get_visit)
                .patch(visits::update_visit)
                .delete(visits::delete_visit),
        )
        .route("/visits/:id/checkout", post(visits::checkout_visit))
        // Card scan
        .route("/scan/rfid", post(scan::scan_rfid))
        // Backup
        .route("/backup", get(backup::download_backup))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api", api)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
