//! Category and product repositories backed by Appwrite collections

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::attributes::{collect_pages, decode, Patch};
use crate::domain::entities::{
    Category, CategoryId, CategoryUpdate, EstablishmentId, NewCategory, NewProduct, Product,
    ProductId, ProductUpdate,
};
use crate::domain::ports::{CategoryRepository, Document, DocumentStore, ProductRepository, Query};
use crate::error::{AppwriteError, DomainError};

// ============================================================================
// Categories
// ============================================================================

pub struct AppwriteCategoryRepository<DS: DocumentStore + ?Sized> {
    store: Arc<DS>,
    collection: String,
}

impl<DS: DocumentStore + ?Sized> AppwriteCategoryRepository<DS> {
    pub fn new(store: Arc<DS>, collection: String) -> Self {
        Self { store, collection }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryAttributes {
    establishment_id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    position: i32,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

fn to_category(doc: &Document) -> Result<Category, DomainError> {
    let attrs: CategoryAttributes = decode(doc)?;
    Ok(Category {
        id: CategoryId(doc.id.clone()),
        establishment_id: EstablishmentId(attrs.establishment_id),
        name: attrs.name,
        description: attrs.description,
        position: attrs.position,
        is_active: attrs.is_active,
    })
}

#[async_trait]
impl<DS: DocumentStore + ?Sized> CategoryRepository for AppwriteCategoryRepository<DS> {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, DomainError> {
        match self.store.get_document(&self.collection, id.as_str()).await {
            Ok(doc) => Ok(Some(to_category(&doc)?)),
            Err(AppwriteError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Vec<Category>, DomainError> {
        let docs = collect_pages(
            self.store.as_ref(),
            &self.collection,
            &[
                Query::equal("establishmentId", establishment_id.as_str()),
                Query::order_asc("position"),
            ],
        )
        .await?;

        docs.iter().map(to_category).collect()
    }

    async fn create(&self, new: &NewCategory) -> Result<Category, DomainError> {
        let data = Patch::new()
            .set("establishmentId", Some(new.establishment_id.as_str()))?
            .set("name", Some(&new.name))?
            .set("description", new.description.as_ref())?
            .set("position", Some(new.position))?
            .set("isActive", Some(new.is_active))?
            .into_map();

        let doc = self.store.create_document(&self.collection, data).await?;
        to_category(&doc)
    }

    async fn update(
        &self,
        id: &CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, DomainError> {
        let patch = Patch::new()
            .set("name", update.name.as_ref())?
            .set("description", update.description.as_ref())?
            .set("position", update.position)?
            .set("isActive", update.is_active)?;

        let doc = if patch.is_empty() {
            self.store.get_document(&self.collection, id.as_str()).await?
        } else {
            self.store
                .update_document(&self.collection, id.as_str(), patch.into_map())
                .await?
        };
        to_category(&doc)
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), DomainError> {
        self.store
            .delete_document(&self.collection, id.as_str())
            .await?;
        Ok(())
    }
}

// ============================================================================
// Products
// ============================================================================

pub struct AppwriteProductRepository<DS: DocumentStore + ?Sized> {
    store: Arc<DS>,
    collection: String,
}

impl<DS: DocumentStore + ?Sized> AppwriteProductRepository<DS> {
    pub fn new(store: Arc<DS>, collection: String) -> Self {
        Self { store, collection }
    }

    async fn list(&self, queries: &[Query]) -> Result<Vec<Product>, DomainError> {
        let docs = collect_pages(self.store.as_ref(), &self.collection, queries).await?;
        docs.iter().map(to_product).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductAttributes {
    establishment_id: String,
    category_id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default = "default_true")]
    is_available: bool,
    #[serde(default)]
    position: i32,
}

fn to_product(doc: &Document) -> Result<Product, DomainError> {
    let attrs: ProductAttributes = decode(doc)?;
    Ok(Product {
        id: ProductId(doc.id.clone()),
        establishment_id: EstablishmentId(attrs.establishment_id),
        category_id: CategoryId(attrs.category_id),
        name: attrs.name,
        description: attrs.description,
        price: attrs.price,
        image_url: attrs.image_url,
        is_available: attrs.is_available,
        position: attrs.position,
    })
}

#[async_trait]
impl<DS: DocumentStore + ?Sized> ProductRepository for AppwriteProductRepository<DS> {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        match self.store.get_document(&self.collection, id.as_str()).await {
            Ok(doc) => Ok(Some(to_product(&doc)?)),
            Err(AppwriteError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Vec<Product>, DomainError> {
        self.list(&[
            Query::equal("establishmentId", establishment_id.as_str()),
            Query::order_asc("position"),
        ])
        .await
    }

    async fn find_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, DomainError> {
        self.list(&[
            Query::equal("categoryId", category_id.as_str()),
            Query::order_asc("position"),
        ])
        .await
    }

    async fn create(&self, new: &NewProduct) -> Result<Product, DomainError> {
        let data = Patch::new()
            .set("establishmentId", Some(new.establishment_id.as_str()))?
            .set("categoryId", Some(new.category_id.as_str()))?
            .set("name", Some(&new.name))?
            .set("description", new.description.as_ref())?
            .set("price", Some(new.price))?
            .set("imageUrl", new.image_url.as_ref())?
            .set("isAvailable", Some(new.is_available))?
            .set("position", Some(new.position))?
            .into_map();

        let doc = self.store.create_document(&self.collection, data).await?;
        to_product(&doc)
    }

    async fn update(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, DomainError> {
        let patch = Patch::new()
            .set("categoryId", update.category_id.as_ref().map(|c| c.as_str()))?
            .set("name", update.name.as_ref())?
            .set("description", update.description.as_ref())?
            .set("price", update.price)?
            .set("imageUrl", update.image_url.as_ref())?
            .set("isAvailable", update.is_available)?
            .set("position", update.position)?;

        let doc = if patch.is_empty() {
            self.store.get_document(&self.collection, id.as_str()).await?
        } else {
            self.store
                .update_document(&self.collection, id.as_str(), patch.into_map())
                .await?
        };
        to_product(&doc)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), DomainError> {
        self.store
            .delete_document(&self.collection, id.as_str())
            .await?;
        Ok(())
    }
}
