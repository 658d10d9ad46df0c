//! Establishment service
//!
//! Merchant-facing management of establishments: profile, slug and schedule.

use std::sync::Arc;

use chrono_tz::Tz;

use super::load_owned;
use crate::domain::entities::{
    validate_business_hours, validate_slug, BusinessHours, Establishment, EstablishmentId,
    EstablishmentUpdate, NewEstablishment,
};
use crate::domain::ports::EstablishmentRepository;
use crate::error::{AppError, DomainError};

const MAX_NAME_LEN: usize = 100;

pub struct EstablishmentService<ER>
where
    ER: EstablishmentRepository + ?Sized,
{
    establishments: Arc<ER>,
}

impl<ER> EstablishmentService<ER>
where
    ER: EstablishmentRepository + ?Sized,
{
    pub fn new(establishments: Arc<ER>) -> Self {
        Self { establishments }
    }

    /// Create an establishment for the merchant in `new.owner_id`
    pub async fn create(&self, mut new: NewEstablishment) -> Result<Establishment, AppError> {
        new.name = validate_name(&new.name)?;
        new.slug = new.slug.trim().to_string();
        validate_slug(&new.slug)?;
        validate_business_hours(&new.business_hours)?;
        new.currency = normalize_currency(&new.currency)?;
        if let Some(tz) = &new.timezone {
            validate_timezone(tz)?;
        }

        self.ensure_slug_free(&new.slug, None).await?;

        let est = self.establishments.create(&new).await?;
        tracing::info!(establishment_id = %est.id, slug = %est.slug, "Establishment created");
        Ok(est)
    }

    /// Public lookup by id
    pub async fn get(&self, id: &EstablishmentId) -> Result<Establishment, AppError> {
        self.establishments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Establishment {} not found", id)))
    }

    /// Lookup for the merchant dashboard
    pub async fn get_owned(
        &self,
        id: &EstablishmentId,
        owner_id: &str,
    ) -> Result<Establishment, AppError> {
        load_owned(self.establishments.as_ref(), id, owner_id).await
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Establishment>, AppError> {
        let mut list = self.establishments.find_by_owner(owner_id).await?;
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(list)
    }

    pub async fn update(
        &self,
        id: &EstablishmentId,
        owner_id: &str,
        mut update: EstablishmentUpdate,
    ) -> Result<Establishment, AppError> {
        load_owned(self.establishments.as_ref(), id, owner_id).await?;

        if let Some(name) = &update.name {
            update.name = Some(validate_name(name)?);
        }
        if let Some(slug) = &update.slug {
            let slug = slug.trim().to_string();
            validate_slug(&slug)?;
            self.ensure_slug_free(&slug, Some(id)).await?;
            update.slug = Some(slug);
        }
        if let Some(currency) = &update.currency {
            update.currency = Some(normalize_currency(currency)?);
        }
        if let Some(Some(tz)) = &update.timezone {
            validate_timezone(tz)?;
        }

        Ok(self.establishments.update(id, &update).await?)
    }

    /// Replace the weekly schedule. Status catches up on the next refresh.
    pub async fn set_business_hours(
        &self,
        id: &EstablishmentId,
        owner_id: &str,
        hours: Vec<BusinessHours>,
    ) -> Result<Establishment, AppError> {
        load_owned(self.establishments.as_ref(), id, owner_id).await?;
        validate_business_hours(&hours)?;
        Ok(self.establishments.update_business_hours(id, &hours).await?)
    }

    pub async fn delete(&self, id: &EstablishmentId, owner_id: &str) -> Result<(), AppError> {
        load_owned(self.establishments.as_ref(), id, owner_id).await?;
        self.establishments.delete(id).await?;
        tracing::info!(establishment_id = %id, "Establishment deleted");
        Ok(())
    }

    async fn ensure_slug_free(
        &self,
        slug: &str,
        except: Option<&EstablishmentId>,
    ) -> Result<(), AppError> {
        match self.establishments.find_by_slug(slug).await? {
            Some(existing) if Some(&existing.id) != except => Err(AppError::Domain(
                DomainError::AlreadyExists(format!("Slug '{}' is already taken", slug)),
            )),
            _ => Ok(()),
        }
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "Name must be between 1 and {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn normalize_currency(code: &str) -> Result<String, DomainError> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::Validation(format!(
            "Currency must be a 3-letter ISO code, got '{}'",
            code
        )));
    }
    Ok(code)
}

fn validate_timezone(tz: &str) -> Result<(), DomainError> {
    tz.parse::<Tz>()
        .map(|_| ())
        .map_err(|_| DomainError::Validation(format!("Unknown timezone '{}'", tz)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DayOfWeek;
    use crate::test_utils::{hours, test_establishment, InMemoryEstablishmentRepository};

    fn new_establishment(slug: &str) -> NewEstablishment {
        NewEstablishment {
            owner_id: "owner-1".to_string(),
            name: "  Casa Pepe ".to_string(),
            slug: slug.to_string(),
            description: None,
            address: None,
            phone: None,
            currency: "eur".to_string(),
            timezone: None,
            business_hours: vec![],
        }
    }

    #[tokio::test]
    async fn create_normalizes_fields() {
        let service = EstablishmentService::new(Arc::new(InMemoryEstablishmentRepository::new()));
        let est = service.create(new_establishment("casa-pepe")).await.unwrap();

        assert_eq!(est.name, "Casa Pepe");
        assert_eq!(est.currency, "EUR");
        assert!(!est.is_open);
        assert!(!est.manual_status_override);
    }

    #[tokio::test]
    async fn create_rejects_taken_slug() {
        let mut existing = test_establishment();
        existing.slug = "casa-pepe".to_string();
        let repo = Arc::new(InMemoryEstablishmentRepository::new().with_establishment(existing));
        let service = EstablishmentService::new(repo);

        let err = service.create(new_establishment("casa-pepe")).await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input() {
        let service = EstablishmentService::new(Arc::new(InMemoryEstablishmentRepository::new()));

        let mut blank = new_establishment("ok");
        blank.name = "   ".to_string();
        assert!(matches!(
            service.create(blank).await,
            Err(AppError::Domain(DomainError::Validation(_)))
        ));

        assert!(service.create(new_establishment("Bad Slug")).await.is_err());

        let mut bad_tz = new_establishment("ok");
        bad_tz.timezone = Some("Nowhere/City".to_string());
        assert!(service.create(bad_tz).await.is_err());

        let mut bad_hours = new_establishment("ok");
        bad_hours.business_hours = vec![hours(DayOfWeek::Monday, "9am", "5pm", true)];
        assert!(service.create(bad_hours).await.is_err());
    }

    #[tokio::test]
    async fn update_allows_keeping_own_slug() {
        let est = test_establishment();
        let (id, owner, slug) = (est.id.clone(), est.owner_id.clone(), est.slug.clone());
        let repo = Arc::new(InMemoryEstablishmentRepository::new().with_establishment(est));
        let service = EstablishmentService::new(repo);

        let updated = service
            .update(
                &id,
                &owner,
                EstablishmentUpdate {
                    slug: Some(slug.clone()),
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, slug);
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn other_merchants_cannot_modify() {
        let est = test_establishment();
        let id = est.id.clone();
        let repo = Arc::new(InMemoryEstablishmentRepository::new().with_establishment(est));
        let service = EstablishmentService::new(repo);

        let err = service.delete(&id, "intruder").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service
            .set_business_hours(&id, "intruder", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn set_business_hours_replaces_schedule() {
        let est = test_establishment();
        let (id, owner) = (est.id.clone(), est.owner_id.clone());
        let repo = Arc::new(InMemoryEstablishmentRepository::new().with_establishment(est));
        let service = EstablishmentService::new(repo);

        let updated = service
            .set_business_hours(
                &id,
                &owner,
                vec![
                    hours(DayOfWeek::Saturday, "10:00", "22:00", true),
                    hours(DayOfWeek::Sunday, "10:00", "16:00", false),
                ],
            )
            .await
            .unwrap();
        assert_eq!(updated.business_hours.len(), 2);
        assert_eq!(updated.business_hours[0].day, DayOfWeek::Saturday);
    }

    #[tokio::test]
    async fn list_for_owner_sorted_by_name() {
        let mut b = test_establishment();
        b.id = EstablishmentId::from("b");
        b.name = "bravo".to_string();
        let mut a = test_establishment();
        a.id = EstablishmentId::from("a");
        a.name = "Alfa".to_string();
        let owner = a.owner_id.clone();
        let repo = Arc::new(
            InMemoryEstablishmentRepository::new()
                .with_establishment(b)
                .with_establishment(a),
        );

        let names: Vec<String> = EstablishmentService::new(repo)
            .list_for_owner(&owner)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Alfa", "bravo"]);
    }
}
