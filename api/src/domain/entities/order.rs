//! Order domain entity
//!
//! Orders are placed from the public menu and worked through the kitchen
//! lifecycle from the merchant dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EstablishmentId, ProductId};

document_id!(
    /// Unique identifier for an order
    OrderId
);

/// How the customer receives the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::DineIn => write!(f, "dine_in"),
            OrderType::Takeaway => write!(f, "takeaway"),
            OrderType::Delivery => write!(f, "delivery"),
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dine_in" => Ok(OrderType::DineIn),
            "takeaway" => Ok(OrderType::Takeaway),
            "delivery" => Ok(OrderType::Delivery),
            _ => Err(format!("Unknown order type: {}", s)),
        }
    }
}

/// Kitchen lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Orders move one step forward at a time; any open order can be cancelled
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Cancelled)
                | (Pending, Confirmed)
                | (Confirmed, Preparing)
                | (Preparing, Ready)
                | (Ready, Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::Ready => write!(f, "ready"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// A line of an order, with name and price captured at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Largest quantity a single order line may ask for
pub const MAX_ITEM_QUANTITY: u32 = 999;

impl OrderItem {
    /// `unit_price * quantity`, or `None` if it does not fit in a `Decimal`
    pub fn subtotal(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Sum of line subtotals, or `None` on overflow
pub fn order_total(items: &[OrderItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.subtotal()?))
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub establishment_id: EstablishmentId,
    /// Short code the customer quotes at the counter
    pub code: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to store a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub establishment_id: EstablishmentId,
    pub code: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
}
