//! Conversions between Appwrite document attributes and typed records

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::ports::{Document, DocumentStore, Query};
use crate::error::DomainError;

/// Page size used when a repository walks a whole collection
pub const PAGE_SIZE: u32 = 100;

/// Deserialize a document's attributes into a typed record
pub fn decode<T: DeserializeOwned>(doc: &Document) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(doc.data.clone())).map_err(|e| {
        DomainError::Database(format!("Malformed document {}: {}", doc.id, e))
    })
}

/// Serialize a typed record into an attribute map
pub fn encode<T: Serialize>(value: &T) -> Result<Map<String, Value>, DomainError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DomainError::Internal(format!(
            "Expected an attribute object, got {}",
            other
        ))),
        Err(e) => Err(DomainError::Internal(e.to_string())),
    }
}

/// Attribute map for partial updates; `None` values are left out
#[derive(Debug, Default)]
pub struct Patch(Map<String, Value>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(mut self, key: &str, value: Option<T>) -> Result<Self, DomainError> {
        if let Some(value) = value {
            let value =
                serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))?;
            self.0.insert(key.to_string(), value);
        }
        Ok(self)
    }

    /// Store a structured value as a JSON string attribute
    pub fn set_json<T: Serialize>(self, key: &str, value: Option<T>) -> Result<Self, DomainError> {
        let encoded = value
            .map(|v| serde_json::to_string(&v))
            .transpose()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        self.set(key, encoded)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Read an attribute that holds either a JSON string or the inline value.
/// Missing, null and blank attributes decode to the default.
pub fn json_or_inline<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(T::default()),
        Some(Value::String(s)) => serde_json::from_str(&s).map_err(D::Error::custom),
        Some(other) => serde_json::from_value(other).map_err(D::Error::custom),
    }
}

/// Write a structured attribute as a JSON string
pub fn as_json_string<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let encoded = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&encoded)
}

/// Queries for one page of a cursor walk
pub fn page_queries(base: &[Query], cursor: Option<&str>) -> Vec<Query> {
    let mut queries = base.to_vec();
    queries.push(Query::Limit(PAGE_SIZE));
    if let Some(cursor) = cursor {
        queries.push(Query::CursorAfter(cursor.to_string()));
    }
    queries
}

/// Walk every page of a listing and return all matching documents
pub async fn collect_pages<DS>(
    store: &DS,
    collection: &str,
    base: &[Query],
) -> Result<Vec<Document>, DomainError>
where
    DS: DocumentStore + ?Sized,
{
    let mut documents = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = store
            .list_documents(collection, &page_queries(base, cursor.as_deref()))
            .await?;
        let fetched = page.documents.len();
        cursor = page.documents.last().map(|d| d.id.clone());
        documents.extend(page.documents);

        if fetched < PAGE_SIZE as usize || cursor.is_none() {
            break;
        }
    }

    Ok(documents)
}
