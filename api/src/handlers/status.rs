//! Open/closed status handlers
//!
//! The scheduler-triggered reconciliation pass, the public status read and
//! the merchant's manual override.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::ApiJson;
use crate::app::{EstablishmentStatus, StatusRefreshReport};
use crate::domain::entities::{EstablishmentId, Merchant};
use crate::error::AppError;
use crate::AppState;

/// Response body for a reconciliation pass
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: StatusRefreshReport,
}

#[derive(Debug, Deserialize)]
pub struct ManualStatusRequest {
    pub is_open: bool,
}

/// GET|POST /cron/establishment-status
///
/// Recompute every establishment's status from its schedule. A store error
/// fails the whole pass with a 500 carrying the underlying message.
pub async fn refresh_statuses(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let report = state.status_service.refresh_all().await?;
    Ok(Json(RefreshResponse {
        success: true,
        report,
    }))
}

/// GET /establishments/:id/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EstablishmentStatus>, AppError> {
    let status = state
        .status_service
        .get_status(&EstablishmentId::from(id))
        .await?;
    Ok(Json(status))
}

/// POST /admin/establishments/:id/manual-status
pub async fn set_manual_status(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ManualStatusRequest>,
) -> Result<Json<EstablishmentStatus>, AppError> {
    let est = state
        .status_service
        .set_manual(&EstablishmentId::from(id), &merchant.id, request.is_open)
        .await?;
    Ok(Json(EstablishmentStatus::from(&est)))
}

/// DELETE /admin/establishments/:id/manual-status
pub async fn clear_manual_status(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<Json<EstablishmentStatus>, AppError> {
    let est = state
        .status_service
        .clear_manual(&EstablishmentId::from(id), &merchant.id)
        .await?;
    Ok(Json(EstablishmentStatus::from(&est)))
}
