//! Subscription repository backed by an Appwrite collection

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attributes::{decode, encode, Patch};
use crate::domain::entities::{
    EstablishmentId, NewSubscription, Plan, Subscription, SubscriptionId, SubscriptionStatus,
};
use crate::domain::ports::{Document, DocumentStore, Query, SubscriptionRepository};
use crate::error::DomainError;

pub struct AppwriteSubscriptionRepository<DS: DocumentStore + ?Sized> {
    store: Arc<DS>,
    collection: String,
}

impl<DS: DocumentStore + ?Sized> AppwriteSubscriptionRepository<DS> {
    pub fn new(store: Arc<DS>, collection: String) -> Self {
        Self { store, collection }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionAttributes {
    establishment_id: String,
    plan: Plan,
    status: SubscriptionStatus,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

fn to_subscription(doc: &Document) -> Result<Subscription, DomainError> {
    let attrs: SubscriptionAttributes = decode(doc)?;
    Ok(Subscription {
        id: Some(SubscriptionId(doc.id.clone())),
        establishment_id: EstablishmentId(attrs.establishment_id),
        plan: attrs.plan,
        status: attrs.status,
        started_at: attrs.started_at,
        expires_at: attrs.expires_at,
    })
}

#[async_trait]
impl<DS: DocumentStore + ?Sized> SubscriptionRepository for AppwriteSubscriptionRepository<DS> {
    async fn find_active(
        &self,
        establishment_id: &EstablishmentId,
    ) -> Result<Option<Subscription>, DomainError> {
        let page = self
            .store
            .list_documents(
                &self.collection,
                &[
                    Query::equal("establishmentId", establishment_id.as_str()),
                    Query::equal("status", SubscriptionStatus::Active.to_string()),
                    Query::order_desc("startedAt"),
                    Query::Limit(1),
                ],
            )
            .await?;

        page.documents.first().map(to_subscription).transpose()
    }

    async fn create(&self, new: &NewSubscription) -> Result<Subscription, DomainError> {
        let data = encode(&SubscriptionAttributes {
            establishment_id: new.establishment_id.to_string(),
            plan: new.plan,
            status: SubscriptionStatus::Active,
            started_at: new.started_at,
            expires_at: new.expires_at,
        })?;

        let doc = self.store.create_document(&self.collection, data).await?;
        to_subscription(&doc)
    }

    async fn cancel(&self, id: &SubscriptionId) -> Result<(), DomainError> {
        let patch = Patch::new().set("status", Some(SubscriptionStatus::Cancelled))?;
        self.store
            .update_document(&self.collection, id.as_str(), patch.into_map())
            .await?;
        Ok(())
    }
}
