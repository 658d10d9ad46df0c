//! Appwrite adapter
//!
//! REST client for the hosted backend and the repositories that map
//! collections onto domain entities.

pub mod attributes;
pub mod client;
pub mod establishment_repo;
pub mod menu_repo;
pub mod order_repo;
pub mod subscription_repo;

pub use client::AppwriteClientImpl;
pub use establishment_repo::AppwriteEstablishmentRepository;
pub use menu_repo::{AppwriteCategoryRepository, AppwriteProductRepository};
pub use order_repo::AppwriteOrderRepository;
pub use subscription_repo::AppwriteSubscriptionRepository;
