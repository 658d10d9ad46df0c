//! Domain layer
//!
//! Restaurant concepts and the rules that do not depend on Appwrite.
//! - `entities`: establishments, menu, orders, subscriptions
//! - `ports`: traits the adapters implement (repositories, document store, accounts)

pub mod entities;
pub mod ports;
