//! JSON backup download

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};

use crate::{error::AppResult, models::visit::Visit};

/// Download every visit as a JSON attachment
#[utoipa::path(
    get,
    path = "/backup",
    tag = "backup",
    responses(
        (status = 200, description = "Full register snapshot", body = Vec<Visit>)
    )
)]
pub async fn download_backup(
    State(state): State<crate::AppState>,
) -> AppResult<impl IntoResponse> {
    let visits = state.services.visits.backup().await?;
    tracing::info!(count = visits.len(), "Backup exported");

    Ok((
        [(header::CONTENT_DISPOSITION, "attachment; filename=backup.json")],
        Json(visits),
    ))
}
