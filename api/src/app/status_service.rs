//! Establishment status service
//!
//! Keeps each establishment's `is_open` flag in line with its weekly
//! schedule, unless the merchant has pinned the status by hand.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::load_owned;
use crate::domain::entities::{Establishment, EstablishmentId, StatusUpdate};
use crate::domain::ports::EstablishmentRepository;
use crate::error::AppError;

/// One establishment whose status flipped during a refresh
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub establishment_id: String,
    pub name: String,
    pub previous: bool,
    pub current: bool,
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct StatusRefreshReport {
    pub checked: usize,
    pub updated: usize,
    /// Establishments left alone because of a manual override
    pub skipped: usize,
    pub changes: Vec<StatusChange>,
    pub ran_at: DateTime<Utc>,
}

/// Public view of an establishment's status
#[derive(Debug, Clone, Serialize)]
pub struct EstablishmentStatus {
    pub establishment_id: String,
    pub is_open: bool,
    pub manual_status_override: bool,
    pub last_auto_status_change: Option<DateTime<Utc>>,
    pub last_manual_status_change: Option<DateTime<Utc>>,
}

impl From<&Establishment> for EstablishmentStatus {
    fn from(est: &Establishment) -> Self {
        Self {
            establishment_id: est.id.to_string(),
            is_open: est.is_open,
            manual_status_override: est.manual_status_override,
            last_auto_status_change: est.last_auto_status_change,
            last_manual_status_change: est.last_manual_status_change,
        }
    }
}

/// Service for open/closed status
pub struct StatusService<ER>
where
    ER: EstablishmentRepository + ?Sized,
{
    establishments: Arc<ER>,
    default_timezone: Tz,
}

impl<ER> StatusService<ER>
where
    ER: EstablishmentRepository + ?Sized,
{
    pub fn new(establishments: Arc<ER>, default_timezone: Tz) -> Self {
        Self {
            establishments,
            default_timezone,
        }
    }

    fn timezone_for(&self, est: &Establishment) -> Tz {
        match est.timezone.as_deref() {
            Some(name) => name.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    establishment_id = %est.id,
                    timezone = name,
                    "Invalid establishment timezone, using default"
                );
                self.default_timezone
            }),
            None => self.default_timezone,
        }
    }

    /// What the schedule says at `now`, in the establishment's local time
    pub fn scheduled_open(&self, est: &Establishment, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone_for(est)).naive_local();
        est.scheduled_open_at(local)
    }

    /// Run a reconciliation pass at the current time
    pub async fn refresh_all(&self) -> Result<StatusRefreshReport, AppError> {
        self.refresh_all_at(Utc::now()).await
    }

    /// Run a reconciliation pass as of `now`.
    ///
    /// Any store error aborts the pass; records already written stay written.
    pub async fn refresh_all_at(&self, now: DateTime<Utc>) -> Result<StatusRefreshReport, AppError> {
        let establishments = self.establishments.list_all().await?;

        let mut report = StatusRefreshReport {
            checked: establishments.len(),
            updated: 0,
            skipped: 0,
            changes: Vec::new(),
            ran_at: now,
        };

        for est in establishments {
            if est.manual_status_override {
                report.skipped += 1;
                continue;
            }

            let should_be_open = self.scheduled_open(&est, now);
            if should_be_open == est.is_open {
                continue;
            }

            self.establishments
                .update_status(
                    &est.id,
                    &StatusUpdate {
                        is_open: Some(should_be_open),
                        last_auto_status_change: Some(now),
                        ..Default::default()
                    },
                )
                .await?;

            tracing::info!(
                establishment_id = %est.id,
                name = %est.name,
                is_open = should_be_open,
                "Establishment status updated from schedule"
            );

            report.updated += 1;
            report.changes.push(StatusChange {
                establishment_id: est.id.to_string(),
                name: est.name,
                previous: est.is_open,
                current: should_be_open,
            });
        }

        tracing::info!(
            checked = report.checked,
            updated = report.updated,
            skipped = report.skipped,
            "Status refresh complete"
        );

        Ok(report)
    }

    /// Current status of an establishment
    pub async fn get_status(&self, id: &EstablishmentId) -> Result<EstablishmentStatus, AppError> {
        let est = self
            .establishments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Establishment {} not found", id)))?;
        Ok(EstablishmentStatus::from(&est))
    }

    /// Pin the status by hand; reconciliation skips it until cleared
    pub async fn set_manual(
        &self,
        id: &EstablishmentId,
        owner_id: &str,
        is_open: bool,
    ) -> Result<Establishment, AppError> {
        load_owned(self.establishments.as_ref(), id, owner_id).await?;

        let est = self
            .establishments
            .update_status(
                id,
                &StatusUpdate {
                    is_open: Some(is_open),
                    manual_status_override: Some(true),
                    last_manual_status_change: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(establishment_id = %id, is_open, "Manual status override set");
        Ok(est)
    }

    /// Drop the manual override and return to the schedule immediately
    pub async fn clear_manual(
        &self,
        id: &EstablishmentId,
        owner_id: &str,
    ) -> Result<Establishment, AppError> {
        self.clear_manual_at(id, owner_id, Utc::now()).await
    }

    pub async fn clear_manual_at(
        &self,
        id: &EstablishmentId,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Establishment, AppError> {
        let est = load_owned(self.establishments.as_ref(), id, owner_id).await?;
        let should_be_open = self.scheduled_open(&est, now);

        let mut update = StatusUpdate {
            manual_status_override: Some(false),
            last_manual_status_change: Some(now),
            ..Default::default()
        };
        if should_be_open != est.is_open {
            update.is_open = Some(should_be_open);
            update.last_auto_status_change = Some(now);
        }

        let est = self.establishments.update_status(id, &update).await?;
        tracing::info!(establishment_id = %id, is_open = est.is_open, "Manual status override cleared");
        Ok(est)
    }
}
