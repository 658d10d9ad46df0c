//! Menu category entity

use serde::{Deserialize, Serialize};

use super::EstablishmentId;

document_id!(
    /// Unique identifier for a menu category
    CategoryId
);

/// A section of an establishment's menu
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub establishment_id: EstablishmentId,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub establishment_id: EstablishmentId,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}
