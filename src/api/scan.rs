//! Card scan endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::visit::{ScanRequest, ScanResult},
    services::visits::ScanOutcome,
};

/// Check a visitor out by RFID card or QR pass
#[utoipa::path(
    post,
    path = "/scan/rfid",
    tag = "scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Active visit checked out", body = ScanResult),
        (status = 400, description = "Card already checked out, or no card given", body = ScanResult),
        (status = 404, description = "Card not registered", body = ScanResult)
    )
)]
pub async fn scan_rfid(
    State(state): State<crate::AppState>,
    Json(request): Json<ScanRequest>,
) -> AppResult<(StatusCode, Json<ScanResult>)> {
    let outcome = state.services.visits.scan_card(&request.rfid).await?;

    let status = match outcome {
        ScanOutcome::CheckedOut(_) => StatusCode::OK,
        ScanOutcome::AlreadyCheckedOut(_) => StatusCode::BAD_REQUEST,
        ScanOutcome::NotRegistered => StatusCode::NOT_FOUND,
    };

    Ok((status, Json(ScanResult::from(outcome))))
}
