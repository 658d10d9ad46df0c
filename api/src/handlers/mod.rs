//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod establishments;
pub mod menu;
pub mod orders;
pub mod status;
pub mod subscriptions;

pub use establishments::{
    create_establishment, delete_establishment, get_establishment, get_my_establishment,
    list_my_establishments, set_business_hours, update_establishment,
};
pub use menu::{
    create_category, create_product, delete_category, delete_product, get_public_menu,
    list_categories, list_products, update_category, update_product,
};
pub use orders::{
    get_order, list_customers, list_orders, place_order, track_order, update_order_status,
};
pub use status::{clear_manual_status, get_status, refresh_statuses, set_manual_status};
pub use subscriptions::{get_subscription, list_plans, subscribe};

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use crate::error::AppError;

/// JSON body extractor whose rejections use the API error shape
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}
