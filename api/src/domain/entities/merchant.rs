//! Authenticated merchant account

use serde::Serialize;

/// The Appwrite user behind an authenticated dashboard request
#[derive(Debug, Clone, Serialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub email: String,
}
