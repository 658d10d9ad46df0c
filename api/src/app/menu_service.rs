//! Menu service
//!
//! Category and product management for merchants, plus the public menu view.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use super::load_owned;
use crate::domain::entities::{
    Category, CategoryId, CategoryUpdate, EstablishmentId, NewCategory, NewProduct, Plan,
    Product, ProductId, ProductUpdate, PublicEstablishment,
};
use crate::domain::ports::{
    CategoryRepository, EstablishmentRepository, ProductRepository, SubscriptionRepository,
};
use crate::error::{AppError, DomainError};

/// A category with the products a customer can order from it
#[derive(Debug, Clone, Serialize)]
pub struct MenuCategory {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// Everything the public menu page needs
#[derive(Debug, Clone, Serialize)]
pub struct PublicMenu {
    pub establishment: PublicEstablishment,
    pub categories: Vec<MenuCategory>,
}

pub struct MenuService<ER, CR, PR, SR>
where
    ER: EstablishmentRepository + ?Sized,
    CR: CategoryRepository + ?Sized,
    PR: ProductRepository + ?Sized,
    SR: SubscriptionRepository + ?Sized,
{
    establishments: Arc<ER>,
    categories: Arc<CR>,
    products: Arc<PR>,
    subscriptions: Arc<SR>,
}

impl<ER, CR, PR, SR> MenuService<ER, CR, PR, SR>
where
    ER: EstablishmentRepository + ?Sized,
    CR: CategoryRepository + ?Sized,
    PR: ProductRepository + ?Sized,
    SR: SubscriptionRepository + ?Sized,
{
    pub fn new(
        establishments: Arc<ER>,
        categories: Arc<CR>,
        products: Arc<PR>,
        subscriptions: Arc<SR>,
    ) -> Self {
        Self {
            establishments,
            categories,
            products,
            subscriptions,
        }
    }

    /// Public menu: active categories with their available products, both
    /// in `position` order
    pub async fn public_menu(&self, slug: &str) -> Result<PublicMenu, AppError> {
        let establishment = self
            .establishments
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Menu '{}' not found", slug)))?;

        let mut categories = self.categories.find_by_establishment(&establishment.id).await?;
        categories.retain(|c| c.is_active);
        categories.sort_by_key(|c| c.position);

        let mut by_category: HashMap<CategoryId, Vec<Product>> = HashMap::new();
        for product in self.products.find_by_establishment(&establishment.id).await? {
            if product.is_available {
                by_category
                    .entry(product.category_id.clone())
                    .or_default()
                    .push(product);
            }
        }

        let categories = categories
            .into_iter()
            .map(|category| {
                let mut products = by_category.remove(&category.id).unwrap_or_default();
                products.sort_by_key(|p| p.position);
                MenuCategory { category, products }
            })
            .collect();

        Ok(PublicMenu {
            establishment: PublicEstablishment::from(establishment),
            categories,
        })
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn list_categories(
        &self,
        establishment_id: &EstablishmentId,
        owner_id: &str,
    ) -> Result<Vec<Category>, AppError> {
        load_owned(self.establishments.as_ref(), establishment_id, owner_id).await?;
        let mut categories = self.categories.find_by_establishment(establishment_id).await?;
        categories.sort_by_key(|c| c.position);
        Ok(categories)
    }

    pub async fn create_category(
        &self,
        owner_id: &str,
        mut new: NewCategory,
    ) -> Result<Category, AppError> {
        load_owned(self.establishments.as_ref(), &new.establishment_id, owner_id).await?;
        new.name = required_name(&new.name)?;
        Ok(self.categories.create(&new).await?)
    }

    pub async fn update_category(
        &self,
        id: &CategoryId,
        owner_id: &str,
        mut update: CategoryUpdate,
    ) -> Result<Category, AppError> {
        self.load_category(id, owner_id).await?;
        if let Some(name) = &update.name {
            update.name = Some(required_name(name)?);
        }
        Ok(self.categories.update(id, &update).await?)
    }

    /// Categories that still hold products cannot be deleted
    pub async fn delete_category(&self, id: &CategoryId, owner_id: &str) -> Result<(), AppError> {
        self.load_category(id, owner_id).await?;

        let remaining = self.products.find_by_category(id).await?.len();
        if remaining > 0 {
            return Err(AppError::Conflict(format!(
                "Category still has {} product(s)",
                remaining
            )));
        }

        self.categories.delete(id).await?;
        Ok(())
    }

    async fn load_category(&self, id: &CategoryId, owner_id: &str) -> Result<Category, AppError> {
        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
        load_owned(self.establishments.as_ref(), &category.establishment_id, owner_id).await?;
        Ok(category)
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn list_products(
        &self,
        establishment_id: &EstablishmentId,
        owner_id: &str,
    ) -> Result<Vec<Product>, AppError> {
        load_owned(self.establishments.as_ref(), establishment_id, owner_id).await?;
        let mut products = self.products.find_by_establishment(establishment_id).await?;
        products.sort_by_key(|p| p.position);
        Ok(products)
    }

    pub async fn create_product(
        &self,
        owner_id: &str,
        mut new: NewProduct,
    ) -> Result<Product, AppError> {
        load_owned(self.establishments.as_ref(), &new.establishment_id, owner_id).await?;
        new.name = required_name(&new.name)?;
        validate_price(new.price)?;
        self.ensure_category_in(&new.category_id, &new.establishment_id)
            .await?;

        let plan = self.current_plan(&new.establishment_id).await?;
        if let Some(limit) = plan.product_limit() {
            let count = self
                .products
                .find_by_establishment(&new.establishment_id)
                .await?
                .len();
            if count >= limit {
                return Err(AppError::Forbidden(format!(
                    "The {} plan allows up to {} products",
                    plan.display_name(),
                    limit
                )));
            }
        }

        let product = self.products.create(&new).await?;
        tracing::debug!(product_id = %product.id, establishment_id = %product.establishment_id, "Product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: &ProductId,
        owner_id: &str,
        mut update: ProductUpdate,
    ) -> Result<Product, AppError> {
        let product = self.load_product(id, owner_id).await?;

        if let Some(name) = &update.name {
            update.name = Some(required_name(name)?);
        }
        if let Some(price) = update.price {
            validate_price(price)?;
        }
        if let Some(category_id) = &update.category_id {
            self.ensure_category_in(category_id, &product.establishment_id)
                .await?;
        }

        Ok(self.products.update(id, &update).await?)
    }

    pub async fn delete_product(&self, id: &ProductId, owner_id: &str) -> Result<(), AppError> {
        self.load_product(id, owner_id).await?;
        self.products.delete(id).await?;
        Ok(())
    }

    async fn load_product(&self, id: &ProductId, owner_id: &str) -> Result<Product, AppError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;
        load_owned(self.establishments.as_ref(), &product.establishment_id, owner_id).await?;
        Ok(product)
    }

    async fn ensure_category_in(
        &self,
        category_id: &CategoryId,
        establishment_id: &EstablishmentId,
    ) -> Result<(), AppError> {
        match self.categories.find_by_id(category_id).await? {
            Some(c) if &c.establishment_id == establishment_id => Ok(()),
            _ => Err(AppError::BadRequest(format!(
                "Category {} does not belong to this establishment",
                category_id
            ))),
        }
    }

    async fn current_plan(&self, establishment_id: &EstablishmentId) -> Result<Plan, AppError> {
        let plan = self
            .subscriptions
            .find_active(establishment_id)
            .await?
            .map(|s| s.effective_plan(Utc::now()))
            .unwrap_or(Plan::Free);
        Ok(plan)
    }
}

fn required_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("Name is required".to_string()));
    }
    Ok(name.to_string())
}

/// Highest price a product may carry, in the establishment's currency
const MAX_PRICE_UNITS: i64 = 1_000_000;

fn validate_price(price: Decimal) -> Result<(), DomainError> {
    if price.is_sign_negative() {
        return Err(DomainError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    if price > Decimal::from(MAX_PRICE_UNITS) {
        return Err(DomainError::Validation(format!(
            "Price must not exceed {}",
            MAX_PRICE_UNITS
        )));
    }
    Ok(())
}
