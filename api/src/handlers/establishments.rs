//! Establishment handlers
//!
//! Public lookup plus the merchant's establishment management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::ApiJson;
use crate::domain::entities::{
    BusinessHours, Establishment, EstablishmentId, EstablishmentUpdate, Merchant, NewEstablishment,
    PublicEstablishment,
};
use crate::error::AppError;
use crate::AppState;

fn default_currency() -> String {
    "USD".to_string()
}

/// Request body for creating an establishment
#[derive(Debug, Deserialize)]
pub struct CreateEstablishmentRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// IANA timezone name, e.g. `America/Mexico_City`
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub business_hours: Vec<BusinessHours>,
}

#[derive(Debug, Deserialize)]
pub struct BusinessHoursRequest {
    pub business_hours: Vec<BusinessHours>,
}

/// GET /establishments/:id
pub async fn get_establishment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicEstablishment>, AppError> {
    let est = state
        .establishment_service
        .get(&EstablishmentId::from(id))
        .await?;
    Ok(Json(PublicEstablishment::from(est)))
}

/// GET /admin/establishments
pub async fn list_my_establishments(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
) -> Result<Json<Vec<Establishment>>, AppError> {
    let list = state
        .establishment_service
        .list_for_owner(&merchant.id)
        .await?;
    Ok(Json(list))
}

/// POST /admin/establishments
pub async fn create_establishment(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    ApiJson(request): ApiJson<CreateEstablishmentRequest>,
) -> Result<(StatusCode, Json<Establishment>), AppError> {
    let est = state
        .establishment_service
        .create(NewEstablishment {
            owner_id: merchant.id,
            name: request.name,
            slug: request.slug,
            description: request.description,
            address: request.address,
            phone: request.phone,
            currency: request.currency,
            timezone: request.timezone,
            business_hours: request.business_hours,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(est)))
}

/// GET /admin/establishments/:id
pub async fn get_my_establishment(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<Json<Establishment>, AppError> {
    let est = state
        .establishment_service
        .get_owned(&EstablishmentId::from(id), &merchant.id)
        .await?;
    Ok(Json(est))
}

/// PATCH /admin/establishments/:id
pub async fn update_establishment(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<EstablishmentUpdate>,
) -> Result<Json<Establishment>, AppError> {
    let est = state
        .establishment_service
        .update(&EstablishmentId::from(id), &merchant.id, update)
        .await?;
    Ok(Json(est))
}

/// PUT /admin/establishments/:id/business-hours
pub async fn set_business_hours(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<BusinessHoursRequest>,
) -> Result<Json<Establishment>, AppError> {
    let est = state
        .establishment_service
        .set_business_hours(
            &EstablishmentId::from(id),
            &merchant.id,
            request.business_hours,
        )
        .await?;
    Ok(Json(est))
}

/// DELETE /admin/establishments/:id
pub async fn delete_establishment(
    State(state): State<AppState>,
    Extension(merchant): Extension<Merchant>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .establishment_service
        .delete(&EstablishmentId::from(id), &merchant.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DayOfWeek;

    #[test]
    fn create_request_defaults() {
        let json = r#"{"name": "Casa", "slug": "casa"}"#;
        let request: CreateEstablishmentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.currency, "USD");
        assert!(request.business_hours.is_empty());
        assert!(request.timezone.is_none());
    }

    #[test]
    fn business_hours_request_uses_day_names() {
        let json = r#"{"business_hours": [
            {"day": "saturday", "open_time": "10:00", "close_time": "22:00", "is_open": true}
        ]}"#;
        let request: BusinessHoursRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.business_hours[0].day, DayOfWeek::Saturday);

        let bad = r#"{"business_hours": [
            {"day": "caturday", "open_time": "10:00", "close_time": "22:00", "is_open": true}
        ]}"#;
        assert!(serde_json::from_str::<BusinessHoursRequest>(bad).is_err());
    }
}
