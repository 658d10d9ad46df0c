//! Menu product entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryId, EstablishmentId};

document_id!(
    /// Unique identifier for a product
    ProductId
);

/// An item on the menu
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub establishment_id: EstablishmentId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub position: i32,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub establishment_id: EstablishmentId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub position: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub position: Option<i32>,
}
