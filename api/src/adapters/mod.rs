//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod appwrite;

pub use appwrite::{
    AppwriteCategoryRepository, AppwriteClientImpl, AppwriteEstablishmentRepository,
    AppwriteOrderRepository, AppwriteProductRepository, AppwriteSubscriptionRepository,
};
