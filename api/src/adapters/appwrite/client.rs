//! Appwrite REST client implementation

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use urlencoding::encode;
use uuid::Uuid;

use crate::domain::ports::{
    AccountClient, AppwriteAccount, Document, DocumentList, DocumentStore, Query,
};
use crate::error::AppwriteError;

/// Implementation of the Appwrite database and account APIs
pub struct AppwriteClientImpl {
    http: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
}

impl AppwriteClientImpl {
    pub fn new(endpoint: String, project_id: String, api_key: String, database_id: String) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id,
            api_key,
            database_id,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn documents_url(&self, collection: &str) -> String {
        self.api_url(&format!(
            "/databases/{}/collections/{}/documents",
            encode(&self.database_id),
            encode(collection)
        ))
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), encode(id))
    }

    /// Server-side request authenticated with the API key
    fn server(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppwriteError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| AppwriteError::Deserialization(e.to_string()))
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), AppwriteError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn error_from(response: reqwest::Response) -> AppwriteError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        // Appwrite error bodies look like {"message": "...", "code": 404, "type": "..."}
        let message = serde_json::from_str::<AppwriteErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);

        match status {
            401 => AppwriteError::Unauthorized,
            404 => AppwriteError::NotFound(message),
            429 => AppwriteError::RateLimited,
            status => AppwriteError::Api { status, message },
        }
    }
}

/// Request types for the Appwrite API
#[derive(Serialize)]
struct CreateDocumentRequest {
    #[serde(rename = "documentId")]
    document_id: String,
    data: Map<String, Value>,
}

#[derive(Serialize)]
struct UpdateDocumentRequest {
    data: Map<String, Value>,
}

#[derive(Deserialize)]
struct AppwriteErrorBody {
    message: String,
}

/// Appwrite document ids: at most 36 chars of `[a-zA-Z0-9._-]`, not starting with a symbol
fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl DocumentStore for AppwriteClientImpl {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, AppwriteError> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_json_string()))
            .collect();

        let response = self
            .server(self.http.get(self.documents_url(collection)))
            .query(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, AppwriteError> {
        let response = self
            .server(self.http.get(self.document_url(collection, id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let body = CreateDocumentRequest {
            document_id: new_document_id(),
            data,
        };

        let response = self
            .server(self.http.post(self.documents_url(collection)))
            .json(&body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, AppwriteError> {
        let response = self
            .server(self.http.patch(self.document_url(collection, id)))
            .json(&UpdateDocumentRequest { data })
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppwriteError> {
        let response = self
            .server(self.http.delete(self.document_url(collection, id)))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}

#[async_trait]
impl AccountClient for AppwriteClientImpl {
    async fn get_account(&self, jwt: &str) -> Result<AppwriteAccount, AppwriteError> {
        // Session-scoped: the JWT replaces the API key
        let response = self
            .http
            .get(self.api_url("/account"))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-JWT", jwt)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
