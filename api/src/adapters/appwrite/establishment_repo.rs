//! Establishment repository backed by an Appwrite collection

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attributes::{collect_pages, decode, json_or_inline, Patch};
use crate::domain::entities::{
    BusinessHours, DayOfWeek, Establishment, EstablishmentId, EstablishmentUpdate,
    NewEstablishment, StatusUpdate,
};
use crate::domain::ports::{Document, DocumentStore, EstablishmentRepository, Query};
use crate::error::{AppwriteError, DomainError};

pub struct AppwriteEstablishmentRepository<DS: DocumentStore + ?Sized> {
    store: Arc<DS>,
    collection: String,
}

impl<DS: DocumentStore + ?Sized> AppwriteEstablishmentRepository<DS> {
    pub fn new(store: Arc<DS>, collection: String) -> Self {
        Self { store, collection }
    }

    async fn fetch(&self, id: &EstablishmentId) -> Result<Establishment, DomainError> {
        let doc = self
            .store
            .get_document(&self.collection, id.as_str())
            .await?;
        to_establishment(&doc)
    }

    async fn patch(
        &self,
        id: &EstablishmentId,
        patch: Patch,
    ) -> Result<Establishment, DomainError> {
        if patch.is_empty() {
            return self.fetch(id).await;
        }
        let doc = self
            .store
            .update_document(&self.collection, id.as_str(), patch.into_map())
            .await?;
        to_establishment(&doc)
    }
}

/// Stored attribute layout of an establishment document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EstablishmentAttributes {
    owner_id: String,
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    logo_url: Option<String>,
    #[serde(default)]
    cover_url: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default, deserialize_with = "json_or_inline")]
    business_hours: Vec<StoredHours>,
    #[serde(default)]
    is_open: bool,
    #[serde(default)]
    manual_status_override: bool,
    #[serde(default)]
    last_auto_status_change: Option<DateTime<Utc>>,
    #[serde(default)]
    last_manual_status_change: Option<DateTime<Utc>>,
}

/// One schedule entry as the dashboard writes it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHours {
    day: StoredDay,
    open_time: String,
    close_time: String,
    #[serde(default)]
    is_open: bool,
}

/// Days arrive as names, or as JavaScript weekday indexes (0 = Sunday)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDay {
    Index(u8),
    Name(String),
}

impl StoredDay {
    fn to_day(&self) -> Option<DayOfWeek> {
        match self {
            StoredDay::Index(0) => Some(DayOfWeek::Sunday),
            StoredDay::Index(1) => Some(DayOfWeek::Monday),
            StoredDay::Index(2) => Some(DayOfWeek::Tuesday),
            StoredDay::Index(3) => Some(DayOfWeek::Wednesday),
            StoredDay::Index(4) => Some(DayOfWeek::Thursday),
            StoredDay::Index(5) => Some(DayOfWeek::Friday),
            StoredDay::Index(6) => Some(DayOfWeek::Saturday),
            StoredDay::Index(_) => None,
            StoredDay::Name(name) => {
                serde_json::from_value(serde_json::Value::String(name.trim().to_lowercase())).ok()
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredHoursOut<'a> {
    day: DayOfWeek,
    open_time: &'a str,
    close_time: &'a str,
    is_open: bool,
}

fn stored_hours(hours: &[BusinessHours]) -> Vec<StoredHoursOut<'_>> {
    hours
        .iter()
        .map(|h| StoredHoursOut {
            day: h.day,
            open_time: &h.open_time,
            close_time: &h.close_time,
            is_open: h.is_open,
        })
        .collect()
}

fn to_establishment(doc: &Document) -> Result<Establishment, DomainError> {
    let attrs: EstablishmentAttributes = decode(doc)?;

    let business_hours = attrs
        .business_hours
        .into_iter()
        .filter_map(|h| match h.day.to_day() {
            Some(day) => Some(BusinessHours {
                day,
                open_time: h.open_time,
                close_time: h.close_time,
                is_open: h.is_open,
            }),
            None => {
                tracing::warn!(establishment_id = %doc.id, day = ?h.day, "Skipping business hours with unknown day");
                None
            }
        })
        .collect();

    Ok(Establishment {
        id: EstablishmentId(doc.id.clone()),
        owner_id: attrs.owner_id,
        name: attrs.name,
        slug: attrs.slug,
        description: attrs.description,
        address: attrs.address,
        phone: attrs.phone,
        logo_url: attrs.logo_url,
        cover_url: attrs.cover_url,
        currency: attrs.currency.unwrap_or_else(|| "USD".to_string()),
        timezone: attrs.timezone,
        business_hours,
        is_open: attrs.is_open,
        manual_status_override: attrs.manual_status_override,
        last_auto_status_change: attrs.last_auto_status_change,
        last_manual_status_change: attrs.last_manual_status_change,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}

#[async_trait]
impl<DS: DocumentStore + ?Sized> EstablishmentRepository for AppwriteEstablishmentRepository<DS> {
    async fn find_by_id(&self, id: &EstablishmentId) -> Result<Option<Establishment>, DomainError> {
        match self.store.get_document(&self.collection, id.as_str()).await {
            Ok(doc) => Ok(Some(to_establishment(&doc)?)),
            Err(AppwriteError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Establishment>, DomainError> {
        let page = self
            .store
            .list_documents(
                &self.collection,
                &[Query::equal("slug", slug), Query::Limit(1)],
            )
            .await?;

        page.documents.first().map(to_establishment).transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Establishment>, DomainError> {
        let docs = collect_pages(
            self.store.as_ref(),
            &self.collection,
            &[Query::equal("ownerId", owner_id)],
        )
        .await?;

        docs.iter().map(to_establishment).collect()
    }

    async fn list_all(&self) -> Result<Vec<Establishment>, DomainError> {
        let docs = collect_pages(self.store.as_ref(), &self.collection, &[]).await?;
        docs.iter().map(to_establishment).collect()
    }

    async fn create(&self, new: &NewEstablishment) -> Result<Establishment, DomainError> {
        let data = Patch::new()
            .set("ownerId", Some(&new.owner_id))?
            .set("name", Some(&new.name))?
            .set("slug", Some(&new.slug))?
            .set("description", new.description.as_ref())?
            .set("address", new.address.as_ref())?
            .set("phone", new.phone.as_ref())?
            .set("currency", Some(&new.currency))?
            .set("timezone", new.timezone.as_ref())?
            .set_json("businessHours", Some(stored_hours(&new.business_hours)))?
            .set("isOpen", Some(false))?
            .set("manualStatusOverride", Some(false))?
            .into_map();

        let doc = self.store.create_document(&self.collection, data).await?;
        to_establishment(&doc)
    }

    async fn update(
        &self,
        id: &EstablishmentId,
        update: &EstablishmentUpdate,
    ) -> Result<Establishment, DomainError> {
        let patch = Patch::new()
            .set("name", update.name.as_ref())?
            .set("slug", update.slug.as_ref())?
            .set("description", update.description.as_ref())?
            .set("address", update.address.as_ref())?
            .set("phone", update.phone.as_ref())?
            .set("logoUrl", update.logo_url.as_ref())?
            .set("coverUrl", update.cover_url.as_ref())?
            .set("currency", update.currency.as_ref())?
            .set("timezone", update.timezone.as_ref())?;

        self.patch(id, patch).await
    }

    async fn update_business_hours(
        &self,
        id: &EstablishmentId,
        hours: &[BusinessHours],
    ) -> Result<Establishment, DomainError> {
        let patch = Patch::new().set_json("businessHours", Some(stored_hours(hours)))?;
        self.patch(id, patch).await
    }

    async fn update_status(
        &self,
        id: &EstablishmentId,
        update: &StatusUpdate,
    ) -> Result<Establishment, DomainError> {
        let patch = Patch::new()
            .set("isOpen", update.is_open)?
            .set("manualStatusOverride", update.manual_status_override)?
            .set("lastAutoStatusChange", update.last_auto_status_change)?
            .set("lastManualStatusChange", update.last_manual_status_change)?;

        self.patch(id, patch).await
    }

    async fn delete(&self, id: &EstablishmentId) -> Result<(), DomainError> {
        self.store
            .delete_document(&self.collection, id.as_str())
            .await?;
        Ok(())
    }
}
