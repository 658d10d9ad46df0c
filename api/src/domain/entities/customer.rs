//! Customers derived from order history
//!
//! There is no customer collection; the dashboard's customer list is built
//! by grouping an establishment's orders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub name: String,
    pub phone: Option<String>,
    pub order_count: u32,
    /// Sum of non-cancelled order totals
    pub total_spent: Decimal,
    pub last_order_at: DateTime<Utc>,
}

/// Grouping key: digits of the phone number, else the case-folded name
fn customer_key(order: &Order) -> String {
    let digits: String = order
        .customer_phone
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        format!("name:{}", order.customer_name.trim().to_lowercase())
    } else {
        format!("phone:{}", digits)
    }
}

/// Aggregate orders into customers, most recent first
pub fn aggregate_customers(orders: &[Order]) -> Vec<Customer> {
    let mut by_key: HashMap<String, Customer> = HashMap::new();

    for order in orders {
        let spent = if order.status == OrderStatus::Cancelled {
            Decimal::ZERO
        } else {
            order.total
        };

        by_key
            .entry(customer_key(order))
            .and_modify(|c| {
                c.order_count += 1;
                c.total_spent = c.total_spent.saturating_add(spent);
                if order.created_at > c.last_order_at {
                    c.last_order_at = order.created_at;
                    c.name = order.customer_name.clone();
                    if order.customer_phone.is_some() {
                        c.phone = order.customer_phone.clone();
                    }
                }
            })
            .or_insert_with(|| Customer {
                name: order.customer_name.clone(),
                phone: order.customer_phone.clone(),
                order_count: 1,
                total_spent: spent,
                last_order_at: order.created_at,
            });
    }

    let mut customers: Vec<Customer> = by_key.into_values().collect();
    customers.sort_by(|a, b| {
        b.last_order_at
            .cmp(&a.last_order_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    customers
}
