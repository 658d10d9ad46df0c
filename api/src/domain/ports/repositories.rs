//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (Appwrite collections).

use async_trait::async_trait;

use crate::domain::entities::{
    BusinessHours, Category, CategoryId, CategoryUpdate, Establishment, EstablishmentId,
    EstablishmentUpdate, NewCategory, NewEstablishment, NewOrder, NewProduct, NewSubscription,
    Order, OrderId, OrderStatus, Product, ProductId, ProductUpdate, StatusUpdate, Subscription,
    SubscriptionId,
};
use crate::error::DomainError;

/// Repository for Establishment entities
#[async_trait]
pub trait EstablishmentRepository: Send + Sync {
    /// Find an establishment by ID
    async fn find_by_id(&self, id: &EstablishmentId) -> Result<Option<Establishment>, DomainError>;

    /// Find an establishment by its public slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Establishment>, DomainError>;

    /// Find all establishments owned by a merchant
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Establishment>, DomainError>;

    /// Every establishment, across all pages
    async fn list_all(&self) -> Result<Vec<Establishment>, DomainError>;

    /// Create a new establishment (closed, no override)
    async fn create(&self, establishment: &NewEstablishment) -> Result<Establishment, DomainError>;

    /// Update merchant-editable fields
    async fn update(
        &self,
        id: &EstablishmentId,
        update: &EstablishmentUpdate,
    ) -> Result<Establishment, DomainError>;

    /// Replace the weekly schedule
    async fn update_business_hours(
        &self,
        id: &EstablishmentId,
        hours: &[BusinessHours],
    ) -> Result<Establishment, DomainError>;

    /// Write open/closed status fields
    async fn update_status(
        &self,
        id: &EstablishmentId,
        update: &StatusUpdate,
    ) -> Result<Establishment, DomainError>;

    /// Delete an establishment
    async fn delete(&self, id: &EstablishmentId) -> Result<(), DomainError>;
}

/// Repository for menu categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, DomainError>;

    /// Categories of an establishment, ordered by position
    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Vec<Category>, DomainError>;

    async fn create(&self, category: &NewCategory) -> Result<Category, DomainError>;

    async fn update(
        &self,
        id: &CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, DomainError>;

    async fn delete(&self, id: &CategoryId) -> Result<(), DomainError>;
}

/// Repository for menu products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// Products of an establishment, ordered by position
    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Vec<Product>, DomainError>;

    /// Products filed under a category
    async fn find_by_category(&self, category_id: &CategoryId)
        -> Result<Vec<Product>, DomainError>;

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError>;

    async fn update(&self, id: &ProductId, update: &ProductUpdate)
        -> Result<Product, DomainError>;

    async fn delete(&self, id: &ProductId) -> Result<(), DomainError>;
}

/// Repository for orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Orders of an establishment, newest first, optionally filtered by status
    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError>;

    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError>;

    async fn update_status(&self, id: &OrderId, status: OrderStatus)
        -> Result<Order, DomainError>;
}

/// Repository for subscription records
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// The active record of an establishment, if any
    async fn find_active(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Option<Subscription>, DomainError>;

    async fn create(&self, subscription: &NewSubscription) -> Result<Subscription, DomainError>;

    /// Mark a record as cancelled
    async fn cancel(&self, id: &SubscriptionId) -> Result<(), DomainError>;
}
