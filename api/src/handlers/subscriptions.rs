//! Subscription handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use super::ApiJson;
use crate::app::PlanInfo;
use crate::domain::entities::{EstablishmentId, Merchant, Plan, Subscription};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub plan: Plan,
}

/// GET /subscriptions/plans
pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<PlanInfo>> {
    Json(state.subscription_service.plans())
}

/// GET /admin/establishments/:id/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<Json<Subscription>, AppError> {
    let subscription = state
        .subscription_service
        .current(&EstablishmentId::from(id), &merchant.id)
        .await?;
    Ok(Json(subscription))
}

/// POST /admin/establishments/:id/subscription
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SubscribeRequest>,
) -> Result<Json<Subscription>, AppError> {
    let subscription = state
        .subscription_service
        .subscribe(&EstablishmentId::from(id), &merchant.id, request.plan)
        .await?;
    Ok(Json(subscription))
}
