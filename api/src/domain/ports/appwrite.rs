//! Appwrite port
//!
//! Traits and DTOs for the hosted backend: the document database that holds
//! every Krato record, and the account API that resolves merchant sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::entities::Merchant;
use crate::error::AppwriteError;

/// A stored document: system fields plus the collection's attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// One page of a document listing
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

/// Appwrite query, encoded as the JSON form accepted by `queries[]`
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, Vec<Value>),
    OrderAsc(String),
    OrderDesc(String),
    Limit(u32),
    CursorAfter(String),
}

impl Query {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::Equal(attribute.to_string(), vec![value.into()])
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::OrderAsc(attribute.to_string())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    pub fn to_json_string(&self) -> String {
        let value = match self {
            Query::Equal(attribute, values) => {
                json!({"method": "equal", "attribute": attribute, "values": values})
            }
            Query::OrderAsc(attribute) => json!({"method": "orderAsc", "attribute": attribute}),
            Query::OrderDesc(attribute) => json!({"method": "orderDesc", "attribute": attribute}),
            Query::Limit(limit) => json!({"method": "limit", "values": [limit]}),
            Query::CursorAfter(id) => json!({"method": "cursorAfter", "values": [id]}),
        };
        value.to_string()
    }
}

/// Appwrite user as returned by `GET /account`
#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteAccount {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl From<AppwriteAccount> for Merchant {
    fn from(account: AppwriteAccount) -> Self {
        Merchant {
            id: account.id,
            name: account.name,
            email: account.email,
        }
    }
}

/// Document database operations, scoped to the configured database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, AppwriteError>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, AppwriteError>;

    async fn create_document(
        &self,
        collection: &str,
        data: Map<String, Value>,
    ) -> Result<Document, AppwriteError>;

    /// Patch the given attributes, leaving the others untouched
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, AppwriteError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppwriteError>;
}

/// Session resolution for dashboard requests
#[async_trait]
pub trait AccountClient: Send + Sync {
    /// Resolve the user behind a client-issued Appwrite JWT
    async fn get_account(&self, jwt: &str) -> Result<AppwriteAccount, AppwriteError>;
}
