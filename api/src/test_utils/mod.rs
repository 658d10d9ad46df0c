//! Test utilities
//!
//! Manual in-memory implementations of the ports and test fixtures.
//!
//! The fakes sit at two levels: `InMemoryDocumentStore` stands in for the
//! Appwrite database under the real adapters, and the repository fakes stand
//! in for the adapters themselves under services and handlers.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
