//! Order handlers
//!
//! Public placement and tracking, and the merchant's order desk.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::ApiJson;
use crate::app::{OrderTracking, PlaceOrder};
use crate::domain::entities::{Customer, EstablishmentId, Merchant, Order, OrderId, OrderStatus};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

/// POST /establishments/:id/orders
pub async fn place_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<PlaceOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state
        .order_service
        .place_order(&EstablishmentId::from(id), request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/:id/status
pub async fn track_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderTracking>, AppError> {
    let tracking = state.order_service.track(&OrderId::from(id)).await?;
    Ok(Json(tracking))
}

/// GET /admin/establishments/:id/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let orders = state
        .order_service
        .list(&EstablishmentId::from(id), &merchant.id, status)
        .await?;
    Ok(Json(orders))
}

/// GET /admin/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .order_service
        .get(&OrderId::from(id), &merchant.id)
        .await?;
    Ok(Json(order))
}

/// PATCH /admin/orders/:id/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let next = parse_status(&request.status)?;
    let order = state
        .order_service
        .update_status(&OrderId::from(id), &merchant.id, next)
        .await?;
    Ok(Json(order))
}

/// GET /admin/establishments/:id/customers
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let customers = state
        .order_service
        .customers(&EstablishmentId::from(id), &merchant.id)
        .await?;
    Ok(Json(customers))
}
