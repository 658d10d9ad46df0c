//! Subscription plans and records
//!
//! Plans are a fixed catalog; a subscription record ties one plan to one
//! establishment. Billing is out of scope, so subscribing only records intent.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EstablishmentId;

document_id!(
    /// Unique identifier for a subscription record
    SubscriptionId
);

/// Length of a paid billing period
pub const BILLING_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Premium,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Free, Plan::Pro, Plan::Premium];

    pub fn display_name(self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Pro => "Pro",
            Plan::Premium => "Premium",
        }
    }

    /// Monthly price
    pub fn monthly_price(self) -> Decimal {
        match self {
            Plan::Free => Decimal::ZERO,
            Plan::Pro => Decimal::new(1900, 2),
            Plan::Premium => Decimal::new(4900, 2),
        }
    }

    /// Maximum number of products on the menu, `None` for unlimited
    pub fn product_limit(self) -> Option<usize> {
        match self {
            Plan::Free => Some(30),
            Plan::Pro => Some(300),
            Plan::Premium => None,
        }
    }

    pub fn is_paid(self) -> bool {
        self != Plan::Free
    }

    /// When a subscription to this plan started at `start` runs out
    pub fn expires_at(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.is_paid()
            .then(|| start + Duration::days(BILLING_PERIOD_DAYS))
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Pro => write!(f, "pro"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            "premium" => Ok(Plan::Premium),
            _ => Err(format!("Unknown plan: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            _ => Err(format!("Unknown subscription status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    /// `None` for the implicit free plan of establishments that never subscribed
    pub id: Option<SubscriptionId>,
    pub establishment_id: EstablishmentId,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// The plan that applies at `now`: expired or cancelled records fall back to free
    pub fn effective_plan(&self, now: DateTime<Utc>) -> Plan {
        let expired = self.expires_at.is_some_and(|at| at <= now);
        if self.status == SubscriptionStatus::Active && !expired {
            self.plan
        } else {
            Plan::Free
        }
    }

    /// Implicit free subscription
    pub fn free(establishment_id: EstablishmentId, since: DateTime<Utc>) -> Self {
        Self {
            id: None,
            establishment_id,
            plan: Plan::Free,
            status: SubscriptionStatus::Active,
            started_at: since,
            expires_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub establishment_id: EstablishmentId,
    pub plan: Plan,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
