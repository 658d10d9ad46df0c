//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    BusinessHours, Category, CategoryId, CategoryUpdate, Establishment, EstablishmentId,
    EstablishmentUpdate, NewCategory, NewEstablishment, NewOrder, NewProduct, NewSubscription,
    Order, OrderId, OrderStatus, Product, ProductId, ProductUpdate, StatusUpdate, Subscription,
    SubscriptionId, SubscriptionStatus,
};
use crate::domain::ports::{
    AccountClient, AppwriteAccount, CategoryRepository, Document, DocumentList, DocumentStore,
    EstablishmentRepository, OrderRepository, ProductRepository, Query, SubscriptionRepository,
};
use crate::error::{AppwriteError, DomainError};

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ============================================================================
// In-Memory Document Store
// ============================================================================

/// Appwrite database stand-in that evaluates the subset of queries the
/// adapters send. Documents are kept per collection, ordered by id.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Document>>>>,
    list_calls: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with raw attributes
    pub fn insert(&self, collection: &str, id: &str, attributes: Value) {
        let data = match attributes {
            Value::Object(map) => map,
            other => panic!("Document attributes must be an object, got {}", other),
        };
        let now = Utc::now();
        self.collections
            .write()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(
                id.to_string(),
                Document {
                    id: id.to_string(),
                    created_at: now,
                    updated_at: now,
                    data,
                },
            );
    }

    /// Stored attributes of a document, without system fields
    pub fn raw(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| Value::Object(doc.data.clone()))
    }

    /// Number of `list_documents` calls served
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(AtomicOrdering::SeqCst)
    }

    fn not_found(collection: &str, id: &str) -> AppwriteError {
        AppwriteError::NotFound(format!("{}/{}", collection, id))
    }
}

fn attribute(doc: &Document, name: &str) -> Value {
    match name {
        "$id" => Value::String(doc.id.clone()),
        "$createdAt" => Value::String(doc.created_at.to_rfc3339()),
        "$updatedAt" => Value::String(doc.updated_at.to_rfc3339()),
        _ => doc.data.get(name).cloned().unwrap_or(Value::Null),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or_default()
            .partial_cmp(&y.as_f64().unwrap_or_default())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, AppwriteError> {
        self.list_calls.fetch_add(1, AtomicOrdering::SeqCst);

        let collections = self.collections.read().unwrap();
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();

        for query in queries {
            if let Query::Equal(name, values) = query {
                docs.retain(|doc| values.contains(&attribute(doc, name)));
            }
        }
        for query in queries.iter().rev() {
            match query {
                Query::OrderAsc(name) => {
                    docs.sort_by(|a, b| compare_values(&attribute(a, name), &attribute(b, name)))
                }
                Query::OrderDesc(name) => {
                    docs.sort_by(|a, b| compare_values(&attribute(b, name), &attribute(a, name)))
                }
                _ => {}
            }
        }
        let total = docs.len() as u64;

        for query in queries {
            if let Query::CursorAfter(id) = query {
                match docs.iter().position(|d| &d.id == id) {
                    Some(index) => {
                        docs.drain(..=index);
                    }
                    None => return Err(Self::not_found(collection, id)),
                }
            }
        }
        if let Some(limit) = queries.iter().find_map(|q| match q {
            Query::Limit(limit) => Some(*limit as usize),
            _ => None,
        }) {
            docs.truncate(limit);
        }

        Ok(DocumentList {
            total,
            documents: docs,
        })
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, AppwriteError> {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let now = Utc::now();
        let doc = Document {
            id: new_id(),
            created_at: now,
            updated_at: now,
            data,
        };
        self.collections
            .write()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let mut collections = self.collections.write().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Self::not_found(collection, id))?;

        doc.data.extend(data);
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppwriteError> {
        self.collections
            .write()
            .unwrap()
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(collection, id))
    }
}

// ============================================================================
// In-Memory Establishment Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryEstablishmentRepository {
    establishments: Arc<RwLock<BTreeMap<EstablishmentId, Establishment>>>,
    status_writes: AtomicUsize,
    write_failure: RwLock<Option<String>>,
}

impl InMemoryEstablishmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an establishment for testing
    pub fn with_establishment(self, establishment: Establishment) -> Self {
        self.establishments
            .write()
            .unwrap()
            .insert(establishment.id.clone(), establishment);
        self
    }

    /// Make every status write fail with a database error
    pub fn failing_writes(self, message: &str) -> Self {
        *self.write_failure.write().unwrap() = Some(message.to_string());
        self
    }

    pub fn get(&self, id: &str) -> Option<Establishment> {
        self.establishments
            .read()
            .unwrap()
            .get(&EstablishmentId::from(id))
            .cloned()
    }

    /// Number of successful status writes
    pub fn status_writes(&self) -> usize {
        self.status_writes.load(AtomicOrdering::SeqCst)
    }

    fn modify(
        &self,
        id: &EstablishmentId,
        apply: impl FnOnce(&mut Establishment),
    ) -> Result<Establishment, DomainError> {
        let mut establishments = self.establishments.write().unwrap();
        let est = establishments
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Establishment {}", id)))?;
        apply(est);
        est.updated_at = Utc::now();
        Ok(est.clone())
    }
}

#[async_trait]
impl EstablishmentRepository for InMemoryEstablishmentRepository {
    async fn find_by_id(&self, id: &EstablishmentId) -> Result<Option<Establishment>, DomainError> {
        Ok(self.establishments.read().unwrap().get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Establishment>, DomainError> {
        Ok(self
            .establishments
            .read()
            .unwrap()
            .values()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Establishment>, DomainError> {
        Ok(self
            .establishments
            .read()
            .unwrap()
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Establishment>, DomainError> {
        Ok(self.establishments.read().unwrap().values().cloned().collect())
    }

    async fn create(&self, new: &NewEstablishment) -> Result<Establishment, DomainError> {
        let now = Utc::now();
        let est = Establishment {
            id: EstablishmentId(new_id()),
            owner_id: new.owner_id.clone(),
            name: new.name.clone(),
            slug: new.slug.clone(),
            description: new.description.clone(),
            address: new.address.clone(),
            phone: new.phone.clone(),
            logo_url: None,
            cover_url: None,
            currency: new.currency.clone(),
            timezone: new.timezone.clone(),
            business_hours: new.business_hours.clone(),
            is_open: false,
            manual_status_override: false,
            last_auto_status_change: None,
            last_manual_status_change: None,
            created_at: now,
            updated_at: now,
        };
        self.establishments
            .write()
            .unwrap()
            .insert(est.id.clone(), est.clone());
        Ok(est)
    }

    async fn update(
        &self,
        id: &EstablishmentId,
        update: &EstablishmentUpdate,
    ) -> Result<Establishment, DomainError> {
        let update = update.clone();
        self.modify(id, |est| {
            if let Some(v) = update.name {
                est.name = v;
            }
            if let Some(v) = update.slug {
                est.slug = v;
            }
            if let Some(v) = update.description {
                est.description = v;
            }
            if let Some(v) = update.address {
                est.address = v;
            }
            if let Some(v) = update.phone {
                est.phone = v;
            }
            if let Some(v) = update.logo_url {
                est.logo_url = v;
            }
            if let Some(v) = update.cover_url {
                est.cover_url = v;
            }
            if let Some(v) = update.currency {
                est.currency = v;
            }
            if let Some(v) = update.timezone {
                est.timezone = v;
            }
        })
    }

    async fn update_business_hours(
        &self,
        id: &EstablishmentId,
        hours: &[BusinessHours],
    ) -> Result<Establishment, DomainError> {
        self.modify(id, |est| est.business_hours = hours.to_vec())
    }

    async fn update_status(
        &self,
        id: &EstablishmentId,
        update: &StatusUpdate,
    ) -> Result<Establishment, DomainError> {
        if let Some(message) = self.write_failure.read().unwrap().clone() {
            return Err(DomainError::Database(message));
        }

        let est = self.modify(id, |est| {
            if let Some(v) = update.is_open {
                est.is_open = v;
            }
            if let Some(v) = update.manual_status_override {
                est.manual_status_override = v;
            }
            if let Some(v) = update.last_auto_status_change {
                est.last_auto_status_change = Some(v);
            }
            if let Some(v) = update.last_manual_status_change {
                est.last_manual_status_change = Some(v);
            }
        })?;
        self.status_writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(est)
    }

    async fn delete(&self, id: &EstablishmentId) -> Result<(), DomainError> {
        self.establishments
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Establishment {}", id)))
    }
}

// ============================================================================
// In-Memory Category Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<BTreeMap<CategoryId, Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, category: Category) {
        self.categories
            .write()
            .unwrap()
            .insert(category.id.clone(), category);
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, DomainError> {
        Ok(self.categories.read().unwrap().get(id).cloned())
    }

    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> = self
            .categories
            .read()
            .unwrap()
            .values()
            .filter(|c| &c.establishment_id == establishment_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.position);
        Ok(categories)
    }

    async fn create(&self, new: &NewCategory) -> Result<Category, DomainError> {
        let category = Category {
            id: CategoryId(new_id()),
            establishment_id: new.establishment_id.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            position: new.position,
            is_active: new.is_active,
        };
        self.insert(category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: &CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, DomainError> {
        let mut categories = self.categories.write().unwrap();
        let category = categories
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Category {}", id)))?;

        if let Some(v) = &update.name {
            category.name = v.clone();
        }
        if let Some(v) = &update.description {
            category.description = Some(v.clone());
        }
        if let Some(v) = update.position {
            category.position = v;
        }
        if let Some(v) = update.is_active {
            category.is_active = v;
        }
        Ok(category.clone())
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), DomainError> {
        self.categories
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Category {}", id)))
    }
}

// ============================================================================
// In-Memory Product Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<ProductId, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products
            .write()
            .unwrap()
            .insert(product.id.clone(), product);
    }

    fn filtered(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .unwrap()
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.position);
        products
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.products.read().unwrap().get(id).cloned())
    }

    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Vec<Product>, DomainError> {
        Ok(self.filtered(|p| &p.establishment_id == establishment_id))
    }

    async fn find_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, DomainError> {
        Ok(self.filtered(|p| &p.category_id == category_id))
    }

    async fn create(&self, new: &NewProduct) -> Result<Product, DomainError> {
        let product = Product {
            id: ProductId(new_id()),
            establishment_id: new.establishment_id.clone(),
            category_id: new.category_id.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            image_url: new.image_url.clone(),
            is_available: new.is_available,
            position: new.position,
        };
        self.insert(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<Product, DomainError> {
        let mut products = self.products.write().unwrap();
        let product = products
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {}", id)))?;

        if let Some(v) = &update.category_id {
            product.category_id = v.clone();
        }
        if let Some(v) = &update.name {
            product.name = v.clone();
        }
        if let Some(v) = &update.description {
            product.description = Some(v.clone());
        }
        if let Some(v) = update.price {
            product.price = v;
        }
        if let Some(v) = &update.image_url {
            product.image_url = Some(v.clone());
        }
        if let Some(v) = update.is_available {
            product.is_available = v;
        }
        if let Some(v) = update.position {
            product.position = v;
        }
        Ok(product.clone())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), DomainError> {
        self.products
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Product {}", id)))
    }
}

// ============================================================================
// In-Memory Order Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) {
        self.orders.write().unwrap().insert(order.id.clone(), order);
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().unwrap().is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.read().unwrap().get(id).cloned())
    }

    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| &o.establishment_id == establishment_id)
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn create(&self, new: &NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: OrderId(new_id()),
            establishment_id: new.establishment_id.clone(),
            code: new.code.clone(),
            customer_name: new.customer_name.clone(),
            customer_phone: new.customer_phone.clone(),
            customer_address: new.customer_address.clone(),
            order_type: new.order_type,
            table_number: new.table_number.clone(),
            notes: new.notes.clone(),
            items: new.items.clone(),
            total: new.total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.insert(order.clone());
        Ok(order)
    }

    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, DomainError> {
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Order {}", id)))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

// ============================================================================
// In-Memory Subscription Repository
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record ever created, cancelled ones included
    pub fn all(&self) -> Vec<Subscription> {
        self.subscriptions.read().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_active(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .unwrap()
            .iter()
            .filter(|s| {
                &s.establishment_id == establishment_id && s.status == SubscriptionStatus::Active
            })
            .max_by_key(|s| s.started_at)
            .cloned())
    }

    async fn create(&self, new: &NewSubscription) -> Result<Subscription, DomainError> {
        let subscription = Subscription {
            id: Some(SubscriptionId(new_id())),
            establishment_id: new.establishment_id.clone(),
            plan: new.plan,
            status: SubscriptionStatus::Active,
            started_at: new.started_at,
            expires_at: new.expires_at,
        };
        self.subscriptions.write().unwrap().push(subscription.clone());
        Ok(subscription)
    }

    async fn cancel(&self, id: &SubscriptionId) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().unwrap();
        let subscription = subscriptions
            .iter_mut()
            .find(|s| s.id.as_ref() == Some(id))
            .ok_or_else(|| DomainError::NotFound(format!("Subscription {}", id)))?;
        subscription.status = SubscriptionStatus::Cancelled;
        Ok(())
    }
}

// ============================================================================
// In-Memory Account Client
// ============================================================================

/// Resolves a fixed set of JWTs to accounts; anything else is unauthorized
#[derive(Default)]
pub struct InMemoryAccountClient {
    sessions: RwLock<HashMap<String, AppwriteAccount>>,
}

impl InMemoryAccountClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, jwt: &str, user_id: &str) -> Self {
        self.sessions.write().unwrap().insert(
            jwt.to_string(),
            AppwriteAccount {
                id: user_id.to_string(),
                name: format!("Merchant {}", user_id),
                email: format!("{}@example.com", user_id),
            },
        );
        self
    }
}

#[async_trait]
impl AccountClient for InMemoryAccountClient {
    async fn get_account(&self, jwt: &str) -> Result<AppwriteAccount, AppwriteError> {
        self.sessions
            .read()
            .unwrap()
            .get(jwt)
            .cloned()
            .ok_or(AppwriteError::Unauthorized)
    }
}
