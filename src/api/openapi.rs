//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{backup, health, scan, visits};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Visitreg API",
        version = "0.1.0",
        description = "Visitor check-in/check-out register REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Visits
        visits::list_visits,
        visits::get_visit,
        visits::create_visit,
        visits::update_visit,
        visits::checkout_visit,
        visits::delete_visit,
        visits::purge_visits,
        // Scan
        scan::scan_rfid,
        // Backup
        backup::download_backup,
    ),
    components(
        schemas(
            crate::models::visit::Visit,
            crate::models::visit::VisitStatus,
            crate::models::visit::StatusFilter,
            crate::models::visit::VisitQuery,
            crate::models::visit::CreateVisit,
            crate::models::visit::VisitPatch,
            crate::models::visit::PurgeRange,
            crate::models::visit::PurgeResponse,
            crate::models::visit::ScanRequest,
            crate::models::visit::ScanResult,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "visits", description = "Visit registration and lifecycle"),
        (name = "scan", description = "RFID / QR pass checkout"),
        (name = "backup", description = "Register snapshot")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
