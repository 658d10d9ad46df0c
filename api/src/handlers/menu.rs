//! Menu handlers
//!
//! The public menu page and the merchant's category and product management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::ApiJson;
use crate::app::PublicMenu;
use crate::domain::entities::{
    Category, CategoryId, CategoryUpdate, EstablishmentId, Merchant, NewCategory, NewProduct,
    Product, ProductId, ProductUpdate,
};
use crate::error::AppError;
use crate::AppState;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub position: i32,
}

/// GET /menu/:slug
pub async fn get_public_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicMenu>, AppError> {
    let menu = state.menu_service.public_menu(&slug).await?;
    Ok(Json(menu))
}

/// GET /admin/establishments/:id/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state
        .menu_service
        .list_categories(&EstablishmentId::from(id), &merchant.id)
        .await?;
    Ok(Json(categories))
}

/// POST /admin/establishments/:id/categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state
        .menu_service
        .create_category(
            &merchant.id,
            NewCategory {
                establishment_id: EstablishmentId::from(id),
                name: request.name,
                description: request.description,
                position: request.position,
                is_active: request.is_active,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PATCH /admin/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<CategoryUpdate>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .menu_service
        .update_category(&CategoryId::from(id), &merchant.id, update)
        .await?;
    Ok(Json(category))
}

/// DELETE /admin/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .menu_service
        .delete_category(&CategoryId::from(id), &merchant.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/establishments/:id/products
pub async fn list_products(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state
        .menu_service
        .list_products(&EstablishmentId::from(id), &merchant.id)
        .await?;
    Ok(Json(products))
}

/// POST /admin/establishments/:id/products
pub async fn create_product(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state
        .menu_service
        .create_product(
            &merchant.id,
            NewProduct {
                establishment_id: EstablishmentId::from(id),
                category_id: request.category_id,
                name: request.name,
                description: request.description,
                price: request.price,
                image_url: request.image_url,
                is_available: request.is_available,
                position: request.position,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /admin/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .menu_service
        .update_product(&ProductId::from(id), &merchant.id, update)
        .await?;
    Ok(Json(product))
}

/// DELETE /admin/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .menu_service
        .delete_product(&ProductId::from(id), &merchant.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
