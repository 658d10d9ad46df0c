//! Order service
//!
//! Public order placement and tracking, and the merchant side of the
//! kitchen lifecycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::load_owned;
use crate::domain::entities::{
    aggregate_customers, order_total, Customer, EstablishmentId, NewOrder, Order, OrderId,
    OrderItem, OrderStatus, OrderType, ProductId, MAX_ITEM_QUANTITY,
};
use crate::domain::ports::{EstablishmentRepository, OrderRepository, ProductRepository};
use crate::error::{AppError, DomainError};

/// Alphabet for order codes; no 0/O or 1/I to avoid misreads at the counter
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

/// Order as submitted from the public menu. Prices are never taken from here.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrder {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    pub order_type: OrderType,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<PlaceOrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// What a customer sees when tracking an order
#[derive(Debug, Clone, Serialize)]
pub struct OrderTracking {
    pub id: OrderId,
    pub code: String,
    pub status: OrderStatus,
    pub total: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderTracking {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            code: order.code.clone(),
            status: order.status,
            total: order.total,
            updated_at: order.updated_at,
        }
    }
}

pub fn generate_order_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct OrderService<ER, PR, OR>
where
    ER: EstablishmentRepository + ?Sized,
    PR: ProductRepository + ?Sized,
    OR: OrderRepository + ?Sized,
{
    establishments: Arc<ER>,
    products: Arc<PR>,
    orders: Arc<OR>,
}

impl<ER, PR, OR> OrderService<ER, PR, OR>
where
    ER: EstablishmentRepository + ?Sized,
    PR: ProductRepository + ?Sized,
    OR: OrderRepository + ?Sized,
{
    pub fn new(establishments: Arc<ER>, products: Arc<PR>, orders: Arc<OR>) -> Self {
        Self {
            establishments,
            products,
            orders,
        }
    }

    /// Place an order from the public menu.
    ///
    /// Names and prices are snapshotted from the stored products and the
    /// total is computed here.
    pub async fn place_order(
        &self,
        establishment_id: &EstablishmentId,
        request: PlaceOrder,
    ) -> Result<Order, AppError> {
        let customer_name = request.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return Err(AppError::BadRequest("customer_name is required".to_string()));
        }
        if request.items.is_empty() {
            return Err(AppError::BadRequest(
                "Order must contain at least one item".to_string(),
            ));
        }
        if request
            .items
            .iter()
            .any(|i| i.quantity == 0 || i.quantity > MAX_ITEM_QUANTITY)
        {
            return Err(AppError::BadRequest(format!(
                "Item quantity must be between 1 and {}",
                MAX_ITEM_QUANTITY
            )));
        }
        let customer_address = non_blank(request.customer_address);
        if request.order_type == OrderType::Delivery && customer_address.is_none() {
            return Err(AppError::BadRequest(
                "customer_address is required for delivery".to_string(),
            ));
        }

        let establishment = self
            .establishments
            .find_by_id(establishment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Establishment {} not found", establishment_id))
            })?;
        if !establishment.is_open {
            return Err(AppError::Conflict(format!(
                "{} is not taking orders right now",
                establishment.name
            )));
        }

        let mut items = Vec::with_capacity(request.items.len());
        for line in request.items {
            let product = self
                .products
                .find_by_id(&line.product_id)
                .await?
                .filter(|p| p.establishment_id == establishment.id)
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown product {}", line.product_id))
                })?;
            if !product.is_available {
                return Err(AppError::BadRequest(format!(
                    "{} is not available",
                    product.name
                )));
            }

            items.push(OrderItem {
                product_id: product.id,
                name: product.name,
                unit_price: product.price,
                quantity: line.quantity,
                notes: non_blank(line.notes),
            });
        }
        let total = order_total(&items)
            .ok_or_else(|| AppError::BadRequest("Order total is too large".to_string()))?;

        let order = self
            .orders
            .create(&NewOrder {
                establishment_id: establishment.id.clone(),
                code: generate_order_code(),
                customer_name,
                customer_phone: non_blank(request.customer_phone),
                customer_address,
                order_type: request.order_type,
                table_number: non_blank(request.table_number),
                notes: non_blank(request.notes),
                items,
                total,
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            establishment_id = %order.establishment_id,
            code = %order.code,
            total = %order.total,
            "Order placed"
        );
        Ok(order)
    }

    /// Public tracking by order id
    pub async fn track(&self, id: &OrderId) -> Result<OrderTracking, AppError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
        Ok(OrderTracking::from(&order))
    }

    /// Orders of an owned establishment, newest first
    pub async fn list(
        &self,
        establishment_id: &EstablishmentId,
        owner_id: &str,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, AppError> {
        load_owned(self.establishments.as_ref(), establishment_id, owner_id).await?;
        let mut orders = self
            .orders
            .find_by_establishment(establishment_id, status)
            .await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn get(&self, id: &OrderId, owner_id: &str) -> Result<Order, AppError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
        load_owned(self.establishments.as_ref(), &order.establishment_id, owner_id).await?;
        Ok(order)
    }

    /// Move an order along its lifecycle
    pub async fn update_status(
        &self,
        id: &OrderId,
        owner_id: &str,
        next: OrderStatus,
    ) -> Result<Order, AppError> {
        let order = self.get(id, owner_id).await?;

        if !order.status.can_transition_to(next) {
            return Err(AppError::Domain(DomainError::Conflict(format!(
                "Cannot move order from {} to {}",
                order.status, next
            ))));
        }

        let updated = self.orders.update_status(id, next).await?;
        tracing::info!(order_id = %id, from = %order.status, to = %next, "Order status changed");
        Ok(updated)
    }

    /// Customers derived from the establishment's order history
    pub async fn customers(
        &self,
        establishment_id: &EstablishmentId,
        owner_id: &str,
    ) -> Result<Vec<Customer>, AppError> {
        load_owned(self.establishments.as_ref(), establishment_id, owner_id).await?;
        let orders = self
            .orders
            .find_by_establishment(establishment_id, None)
            .await?;
        Ok(aggregate_customers(&orders))
    }
}
