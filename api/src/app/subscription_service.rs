//! Subscription service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::load_owned;
use crate::domain::entities::{EstablishmentId, NewSubscription, Plan, Subscription};
use crate::domain::ports::{EstablishmentRepository, SubscriptionRepository};
use crate::error::AppError;

/// Catalog entry for the plans endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PlanInfo {
    pub plan: Plan,
    pub name: &'static str,
    pub monthly_price: Decimal,
    /// `None` means unlimited
    pub product_limit: Option<usize>,
}

impl From<Plan> for PlanInfo {
    fn from(plan: Plan) -> Self {
        Self {
            plan,
            name: plan.display_name(),
            monthly_price: plan.monthly_price(),
            product_limit: plan.product_limit(),
        }
    }
}

pub struct SubscriptionService<ER, SR>
where
    ER: EstablishmentRepository + ?Sized,
    SR: SubscriptionRepository + ?Sized,
{
    establishments: Arc<ER>,
    subscriptions: Arc<SR>,
}

impl<ER, SR> SubscriptionService<ER, SR>
where
    ER: EstablishmentRepository + ?Sized,
    SR: SubscriptionRepository + ?Sized,
{
    pub fn new(establishments: Arc<ER>, subscriptions: Arc<SR>) -> Self {
        Self {
            establishments,
            subscriptions,
        }
    }

    pub fn plans(&self) -> Vec<PlanInfo> {
        Plan::ALL.into_iter().map(PlanInfo::from).collect()
    }

    /// Subscription in force now, or an implicit free one when there is none
    pub async fn current(
        &self,
        establishment_id: &EstablishmentId,
        owner_id: &str,
    ) -> Result<Subscription, AppError> {
        self.current_at(establishment_id, owner_id, Utc::now()).await
    }

    /// Same plan the product limit is enforced against: a lapsed paid
    /// record reads as free from its expiry on.
    pub async fn current_at(
        &self,
        establishment_id: &EstablishmentId,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Subscription, AppError> {
        let est = load_owned(self.establishments.as_ref(), establishment_id, owner_id).await?;
        let current = self.subscriptions.find_active(establishment_id).await?;

        Ok(match current {
            Some(sub) if sub.effective_plan(now) == sub.plan => sub,
            Some(lapsed) => {
                let since = lapsed.expires_at.unwrap_or(est.created_at);
                Subscription::free(est.id, since)
            }
            None => Subscription::free(est.id, est.created_at),
        })
    }

    /// Switch to `plan`. The previous active record, if any, is cancelled.
    pub async fn subscribe(
        &self,
        establishment_id: &EstablishmentId,
        owner_id: &str,
        plan: Plan,
    ) -> Result<Subscription, AppError> {
        load_owned(self.establishments.as_ref(), establishment_id, owner_id).await?;

        if let Some(previous) = self.subscriptions.find_active(establishment_id).await? {
            if let Some(id) = &previous.id {
                self.subscriptions.cancel(id).await?;
            }
        }

        let now = Utc::now();
        let subscription = self
            .subscriptions
            .create(&NewSubscription {
                establishment_id: establishment_id.clone(),
                plan,
                started_at: now,
                expires_at: plan.expires_at(now),
            })
            .await?;

        tracing::info!(establishment_id = %establishment_id, plan = %plan, "Subscription changed");
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::entities::SubscriptionStatus;
    use crate::test_utils::{
        test_establishment, InMemoryEstablishmentRepository, InMemorySubscriptionRepository,
    };

    fn setup() -> (
        SubscriptionService<InMemoryEstablishmentRepository, InMemorySubscriptionRepository>,
        Arc<InMemorySubscriptionRepository>,
        EstablishmentId,
        String,
    ) {
        let est = test_establishment();
        let (id, owner) = (est.id.clone(), est.owner_id.clone());
        let subs = Arc::new(InMemorySubscriptionRepository::new());
        let service = SubscriptionService::new(
            Arc::new(InMemoryEstablishmentRepository::new().with_establishment(est)),
            subs.clone(),
        );
        (service, subs, id, owner)
    }

    #[tokio::test]
    async fn no_subscription_means_free() {
        let (service, _, id, owner) = setup();
        let current = service.current(&id, &owner).await.unwrap();
        assert_eq!(current.plan, Plan::Free);
        assert!(current.id.is_none());
    }

    #[tokio::test]
    async fn subscribing_replaces_previous_plan() {
        let (service, subs, id, owner) = setup();

        let pro = service.subscribe(&id, &owner, Plan::Pro).await.unwrap();
        assert!(pro.expires_at.is_some());
        let premium = service.subscribe(&id, &owner, Plan::Premium).await.unwrap();

        let current = service.current(&id, &owner).await.unwrap();
        assert_eq!(current.plan, Plan::Premium);
        assert_eq!(current.id, premium.id);

        let all = subs.all();
        assert_eq!(all.len(), 2);
        let old = all.iter().find(|s| s.id == pro.id).unwrap();
        assert_eq!(old.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn expired_paid_plan_reads_as_free() {
        let (service, subs, id, owner) = setup();
        let started = Utc::now() - Duration::days(45);
        let expires = started + Duration::days(30);
        subs.create(&NewSubscription {
            establishment_id: id.clone(),
            plan: Plan::Pro,
            started_at: started,
            expires_at: Some(expires),
        })
        .await
        .unwrap();

        let current = service.current(&id, &owner).await.unwrap();
        assert_eq!(current.plan, Plan::Free);
        assert!(current.id.is_none());
        assert_eq!(current.started_at, expires);

        let before_expiry = service
            .current_at(&id, &owner, expires - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(before_expiry.plan, Plan::Pro);
    }

    #[tokio::test]
    async fn subscribe_requires_owner() {
        let (service, _, id, _) = setup();
        let err = service.subscribe(&id, "intruder", Plan::Pro).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn catalog_lists_every_plan() {
        let (service, ..) = setup();
        let plans = service.plans();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[1].monthly_price, Decimal::new(1900, 2));
        assert_eq!(plans[2].product_limit, None);
    }
}
