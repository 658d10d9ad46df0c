//! Order repository backed by an Appwrite collection

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::attributes::{collect_pages, decode, json_or_inline, Patch};
use crate::domain::entities::{
    EstablishmentId, NewOrder, Order, OrderId, OrderItem, OrderStatus, OrderType,
};
use crate::domain::ports::{Document, DocumentStore, OrderRepository, Query};
use crate::error::{AppwriteError, DomainError};

pub struct AppwriteOrderRepository<DS: DocumentStore + ?Sized> {
    store: Arc<DS>,
    collection: String,
}

impl<DS: DocumentStore + ?Sized> AppwriteOrderRepository<DS> {
    pub fn new(store: Arc<DS>, collection: String) -> Self {
        Self { store, collection }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderAttributes {
    establishment_id: String,
    #[serde(default)]
    code: String,
    customer_name: String,
    #[serde(default)]
    customer_phone: Option<String>,
    #[serde(default)]
    customer_address: Option<String>,
    order_type: String,
    #[serde(default)]
    table_number: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default, deserialize_with = "json_or_inline")]
    items: Vec<OrderItem>,
    total: Decimal,
    status: String,
}

fn to_order(doc: &Document) -> Result<Order, DomainError> {
    let attrs: OrderAttributes = decode(doc)?;
    let order_type: OrderType = attrs
        .order_type
        .parse()
        .map_err(|e: String| DomainError::Database(format!("Order {}: {}", doc.id, e)))?;
    let status: OrderStatus = attrs
        .status
        .parse()
        .map_err(|e: String| DomainError::Database(format!("Order {}: {}", doc.id, e)))?;

    Ok(Order {
        id: OrderId(doc.id.clone()),
        establishment_id: EstablishmentId(attrs.establishment_id),
        code: attrs.code,
        customer_name: attrs.customer_name,
        customer_phone: attrs.customer_phone,
        customer_address: attrs.customer_address,
        order_type,
        table_number: attrs.table_number,
        notes: attrs.notes,
        items: attrs.items,
        total: attrs.total,
        status,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}

#[async_trait]
impl<DS: DocumentStore + ?Sized> OrderRepository for AppwriteOrderRepository<DS> {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        match self.store.get_document(&self.collection, id.as_str()).await {
            Ok(doc) => Ok(Some(to_order(&doc)?)),
            Err(AppwriteError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_establishment(
        &self,
        establishment_id: &EstablishmentId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut queries = vec![Query::equal("establishmentId", establishment_id.as_str())];
        if let Some(status) = status {
            queries.push(Query::equal("status", status.to_string()));
        }
        queries.push(Query::order_desc("$createdAt"));

        let docs = collect_pages(self.store.as_ref(), &self.collection, &queries).await?;
        docs.iter().map(to_order).collect()
    }

    async fn create(&self, new: &NewOrder) -> Result<Order, DomainError> {
        let data = Patch::new()
            .set("establishmentId", Some(new.establishment_id.as_str()))?
            .set("code", Some(&new.code))?
            .set("customerName", Some(&new.customer_name))?
            .set("customerPhone", new.customer_phone.as_ref())?
            .set("customerAddress", new.customer_address.as_ref())?
            .set("orderType", Some(new.order_type.to_string()))?
            .set("tableNumber", new.table_number.as_ref())?
            .set("notes", new.notes.as_ref())?
            .set_json("items", Some(&new.items))?
            .set("total", Some(new.total))?
            .set("status", Some(OrderStatus::Pending.to_string()))?
            .into_map();

        let doc = self.store.create_document(&self.collection, data).await?;
        to_order(&doc)
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let patch = Patch::new().set("status", Some(status.to_string()))?;
        let doc = self
            .store
            .update_document(&self.collection, id.as_str(), patch.into_map())
            .await?;
        to_order(&doc)
    }
}
