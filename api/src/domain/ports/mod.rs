//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod appwrite;
pub mod repositories;

pub use appwrite::{AccountClient, AppwriteAccount, Document, DocumentList, DocumentStore, Query};
pub use repositories::{
    CategoryRepository, EstablishmentRepository, OrderRepository, ProductRepository,
    SubscriptionRepository,
};
