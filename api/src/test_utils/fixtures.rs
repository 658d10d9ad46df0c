//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::{
    BusinessHours, Category, CategoryId, DayOfWeek, Establishment, EstablishmentId, Order,
    OrderId, OrderItem, OrderStatus, OrderType, Product, ProductId,
};

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One schedule entry
pub fn hours(day: DayOfWeek, open_time: &str, close_time: &str, is_open: bool) -> BusinessHours {
    BusinessHours {
        day,
        open_time: open_time.to_string(),
        close_time: close_time.to_string(),
        is_open,
    }
}

/// Create a test establishment: closed, no override, no schedule
pub fn test_establishment() -> Establishment {
    let now = Utc::now();
    Establishment {
        id: EstablishmentId::from("est-1"),
        owner_id: "owner-1".to_string(),
        name: "La Taqueria".to_string(),
        slug: "la-taqueria".to_string(),
        description: Some("Tacos al pastor".to_string()),
        address: Some("Calle Mayor 1".to_string()),
        phone: Some("555-0000".to_string()),
        logo_url: None,
        cover_url: None,
        currency: "EUR".to_string(),
        timezone: None,
        business_hours: Vec::new(),
        is_open: false,
        manual_status_override: false,
        last_auto_status_change: None,
        last_manual_status_change: None,
        created_at: now,
        updated_at: now,
    }
}

/// Create an active category for an establishment
pub fn test_category(establishment_id: &EstablishmentId, name: &str) -> Category {
    Category {
        id: CategoryId(short_id()),
        establishment_id: establishment_id.clone(),
        name: name.to_string(),
        description: None,
        position: 0,
        is_active: true,
    }
}

/// Create an available product priced at 5.00
pub fn test_product(
    establishment_id: &EstablishmentId,
    category_id: &CategoryId,
    name: &str,
) -> Product {
    Product {
        id: ProductId(short_id()),
        establishment_id: establishment_id.clone(),
        category_id: category_id.clone(),
        name: name.to_string(),
        description: None,
        price: Decimal::new(500, 2),
        image_url: None,
        is_available: true,
        position: 0,
    }
}

/// Create a pending takeaway order placed just now
pub fn test_order() -> Order {
    let now = Utc::now();
    Order {
        id: OrderId(short_id()),
        establishment_id: EstablishmentId::from("est-1"),
        code: "ABC234".to_string(),
        customer_name: "Ana".to_string(),
        customer_phone: Some("555-0100".to_string()),
        customer_address: None,
        order_type: OrderType::Takeaway,
        table_number: None,
        notes: None,
        items: vec![OrderItem {
            product_id: ProductId::from("prod-1"),
            name: "Taco".to_string(),
            unit_price: Decimal::new(500, 2),
            quantity: 1,
            notes: None,
        }],
        total: Decimal::new(500, 2),
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}
