//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! Persistence shapes (Appwrite documents) live in the adapters.

/// Declares a string-backed document identifier newtype.
///
/// Appwrite document ids are opaque strings, so every entity id wraps one.
macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub mod category;
pub mod customer;
pub mod establishment;
pub mod merchant;
pub mod order;
pub mod product;
pub mod subscription;

pub use category::{Category, CategoryId, CategoryUpdate, NewCategory};
pub use customer::{aggregate_customers, Customer};
pub use establishment::{
    validate_business_hours, validate_slug, BusinessHours, DayOfWeek, Establishment,
    EstablishmentId, EstablishmentUpdate, NewEstablishment, PublicEstablishment, StatusUpdate,
};
pub use merchant::Merchant;
pub use order::{
    order_total, NewOrder, Order, OrderId, OrderItem, OrderStatus, OrderType, MAX_ITEM_QUANTITY,
};
pub use product::{NewProduct, Product, ProductId, ProductUpdate};
pub use subscription::{NewSubscription, Plan, Subscription, SubscriptionId, SubscriptionStatus};
