//! Visit endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::visit::{CreateVisit, PurgeRange, PurgeResponse, Visit, VisitPatch, VisitQuery},
};

/// List visits with optional status filter and search
#[utoipa::path(
    get,
    path = "/visits",
    tag = "visits",
    params(VisitQuery),
    responses(
        (status = 200, description = "Visits, most recent check-in first", body = Vec<Visit>),
        (status = 400, description = "Invalid status filter")
    )
)]
pub async fn list_visits(
    State(state): State<crate::AppState>,
    Query(query): Query<VisitQuery>,
) -> AppResult<Json<Vec<Visit>>> {
    let visits = state.services.visits.list(&query).await?;
    Ok(Json(visits))
}

/// Get visit by ID
#[utoipa::path(
    get,
    path = "/visits/{id}",
    tag = "visits",
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit details", body = Visit),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_visit(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Visit>> {
    let visit = state.services.visits.get_by_id(id).await?;
    Ok(Json(visit))
}

/// Register (check in) a visitor
#[utoipa::path(
    post,
    path = "/visits",
    tag = "visits",
    request_body = CreateVisit,
    responses(
        (status = 201, description = "Visitor checked in", body = Visit),
        (status = 400, description = "Missing or invalid field", body = crate::error::ErrorResponse),
        (status = 409, description = "Card is held by a checked-in visitor", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_visit(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateVisit>,
) -> AppResult<(StatusCode, Json<Visit>)> {
    let visit = state.services.visits.register(data).await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

/// Partially update a visit
#[utoipa::path(
    patch,
    path = "/visits/{id}",
    tag = "visits",
    params(("id" = i32, Path, description = "Visit ID")),
    request_body = VisitPatch,
    responses(
        (status = 200, description = "Visit updated", body = Visit),
        (status = 400, description = "Patch would break the visit lifecycle", body = crate::error::ErrorResponse),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Unknown or immutable field")
    )
)]
pub async fn update_visit(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<VisitPatch>,
) -> AppResult<Json<Visit>> {
    let visit = state.services.visits.update(id, patch).await?;
    Ok(Json(visit))
}

/// Check a visitor out
#[utoipa::path(
    post,
    path = "/visits/{id}/checkout",
    tag = "visits",
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visitor checked out (unchanged if already out)", body = Visit),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout_visit(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Visit>> {
    let visit = state.services.visits.checkout(id).await?;
    Ok(Json(visit))
}

/// Delete a visit
#[utoipa::path(
    delete,
    path = "/visits/{id}",
    tag = "visits",
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 204, description = "Visit deleted"),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_visit(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.visits.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every visit older than the retention window
#[utoipa::path(
    delete,
    path = "/visits/purge/{range}",
    tag = "visits",
    params(("range" = PurgeRange, Path, description = "week, month or year")),
    responses(
        (status = 200, description = "Old visits deleted", body = PurgeResponse),
        (status = 400, description = "Unknown range")
    )
)]
pub async fn purge_visits(
    State(state): State<crate::AppState>,
    Path(range): Path<PurgeRange>,
) -> AppResult<Json<PurgeResponse>> {
    let deleted = state.services.visits.purge(range).await?;
    Ok(Json(PurgeResponse {
        deleted,
        message: format!("Deleted {} visits older than one {}", deleted, range.label()),
    }))
}
