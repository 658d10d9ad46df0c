//! Establishment domain entity
//!
//! A restaurant (merchant tenant) with its weekly schedule and the
//! open/closed status that the reconciliation job keeps in sync.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

document_id!(
    /// Unique identifier for an establishment
    EstablishmentId
);

/// Day of the week as stored in business hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        };
        f.write_str(name)
    }
}

/// One day of the weekly schedule. Times are `HH:MM` in 24h format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub day: DayOfWeek,
    pub open_time: String,
    pub close_time: String,
    pub is_open: bool,
}

impl BusinessHours {
    /// Whether `time` (an `HH:MM` string) falls inside this entry.
    ///
    /// Comparison is lexicographic and inclusive on both ends, so an entry
    /// whose close time sorts before its open time never matches.
    pub fn contains(&self, time: &str) -> bool {
        self.is_open && self.open_time.as_str() <= time && time <= self.close_time.as_str()
    }
}

/// A restaurant tenant
#[derive(Debug, Clone, Serialize)]
pub struct Establishment {
    pub id: EstablishmentId,
    pub owner_id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub currency: String,
    /// IANA timezone name; the service default applies when absent
    pub timezone: Option<String>,
    pub business_hours: Vec<BusinessHours>,
    pub is_open: bool,
    pub manual_status_override: bool,
    pub last_auto_status_change: Option<DateTime<Utc>>,
    pub last_manual_status_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Establishment {
    /// Whether the weekly schedule says this establishment is open at the
    /// given local wall-clock time. Ignores the manual override.
    pub fn scheduled_open_at(&self, local: NaiveDateTime) -> bool {
        let today = DayOfWeek::from(local.weekday());
        let time = local.format("%H:%M").to_string();

        self.business_hours
            .iter()
            .find(|h| h.day == today)
            .is_some_and(|h| h.contains(&time))
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// What unauthenticated clients see of an establishment. Leaves out the
/// owner's account id and the override bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct PublicEstablishment {
    pub id: EstablishmentId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub currency: String,
    pub timezone: Option<String>,
    pub business_hours: Vec<BusinessHours>,
    pub is_open: bool,
}

impl From<Establishment> for PublicEstablishment {
    fn from(est: Establishment) -> Self {
        Self {
            id: est.id,
            name: est.name,
            slug: est.slug,
            description: est.description,
            address: est.address,
            phone: est.phone,
            logo_url: est.logo_url,
            cover_url: est.cover_url,
            currency: est.currency,
            timezone: est.timezone,
            business_hours: est.business_hours,
            is_open: est.is_open,
        }
    }
}

/// Data needed to create a new establishment
#[derive(Debug, Clone)]
pub struct NewEstablishment {
    pub owner_id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub currency: String,
    pub timezone: Option<String>,
    pub business_hours: Vec<BusinessHours>,
}

/// Absent field -> `None`, explicit `null` -> `Some(None)`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update of the merchant-editable fields.
///
/// Optional attributes take `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstablishmentUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub cover_url: Option<Option<String>>,
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub timezone: Option<Option<String>>,
}

impl EstablishmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.logo_url.is_none()
            && self.cover_url.is_none()
            && self.currency.is_none()
            && self.timezone.is_none()
    }
}

/// Status fields written by reconciliation and manual overrides.
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub is_open: Option<bool>,
    pub manual_status_override: Option<bool>,
    pub last_auto_status_change: Option<DateTime<Utc>>,
    pub last_manual_status_change: Option<DateTime<Utc>>,
}

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern compiles"))
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").expect("time pattern compiles"))
}

/// Slugs are lowercase alphanumeric words separated by single hyphens
pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.len() > 64 || !slug_regex().is_match(slug) {
        return Err(DomainError::Validation(format!(
            "Invalid slug '{}': use lowercase letters, digits and single hyphens",
            slug
        )));
    }
    Ok(())
}

/// Validate a weekly schedule before it is stored
pub fn validate_business_hours(hours: &[BusinessHours]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();

    for entry in hours {
        if !seen.insert(entry.day) {
            return Err(DomainError::Validation(format!(
                "Duplicate business hours for {}",
                entry.day
            )));
        }
        for time in [&entry.open_time, &entry.close_time] {
            if !time_regex().is_match(time) {
                return Err(DomainError::Validation(format!(
                    "Invalid time '{}' for {}: expected HH:MM",
                    time, entry.day
                )));
            }
        }
        if entry.open_time > entry.close_time {
            return Err(DomainError::Validation(format!(
                "Closing time must not be before opening time on {}",
                entry.day
            )));
        }
    }

    Ok(())
}
