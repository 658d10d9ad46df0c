use std::env;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ConfigError;

/// Appwrite collection identifiers inside the Krato database
#[derive(Clone, Debug)]
pub struct Collections {
    pub establishments: String,
    pub categories: String,
    pub products: String,
    pub orders: String,
    pub subscriptions: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            establishments: "establishments".to_string(),
            categories: "categories".to_string(),
            products: "products".to_string(),
            orders: "orders".to_string(),
            subscriptions: "subscriptions".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Appwrite REST endpoint, e.g. `https://cloud.appwrite.io/v1`
    pub appwrite_endpoint: String,
    pub appwrite_project_id: String,
    pub appwrite_api_key: String,
    pub appwrite_database_id: String,
    pub collections: Collections,
    /// Bearer token expected on the cron endpoint. Unset disables the check.
    pub cron_secret_token: Option<String>,
    /// Timezone used for establishments without their own
    pub default_timezone: Tz,
    /// In-process status refresh period. `None` leaves it to the external cron.
    pub status_refresh_interval: Option<Duration>,
    /// Public order placements allowed per client IP per minute
    pub order_rate_limit_per_minute: u32,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Collections::default();
        let collections = Collections {
            establishments: var_or(
                "APPWRITE_ESTABLISHMENTS_COLLECTION_ID",
                &defaults.establishments,
            ),
            categories: var_or("APPWRITE_CATEGORIES_COLLECTION_ID", &defaults.categories),
            products: var_or("APPWRITE_PRODUCTS_COLLECTION_ID", &defaults.products),
            orders: var_or("APPWRITE_ORDERS_COLLECTION_ID", &defaults.orders),
            subscriptions: var_or(
                "APPWRITE_SUBSCRIPTIONS_COLLECTION_ID",
                &defaults.subscriptions,
            ),
        };

        let timezone = var_or("TIMEZONE", "UTC");
        let default_timezone = timezone.parse::<Tz>().map_err(|_| ConfigError::Invalid {
            name: "TIMEZONE",
            value: timezone.clone(),
        })?;

        let status_refresh_interval = match env::var("STATUS_REFRESH_INTERVAL_SECS").ok() {
            Some(raw) => {
                let secs = parse_var::<u64>("STATUS_REFRESH_INTERVAL_SECS", &raw)?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let order_rate_limit_per_minute = match env::var("ORDER_RATE_LIMIT_PER_MINUTE").ok() {
            Some(raw) => parse_var::<u32>("ORDER_RATE_LIMIT_PER_MINUTE", &raw)?,
            None => 10,
        };

        let port = match env::var("PORT").ok() {
            Some(raw) => parse_var::<u16>("PORT", &raw)?,
            None => 8080,
        };

        Ok(Self {
            appwrite_endpoint: required("APPWRITE_ENDPOINT")?,
            appwrite_project_id: required("APPWRITE_PROJECT_ID")?,
            appwrite_api_key: required("APPWRITE_API_KEY")?,
            appwrite_database_id: var_or("APPWRITE_DATABASE_ID", "krato"),
            collections,
            cron_secret_token: env::var("CRON_SECRET_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            default_timezone,
            status_refresh_interval,
            order_rate_limit_per_minute,
            port,
        })
    }

    /// Check if the cron endpoint requires a bearer token
    pub fn cron_auth_enabled(&self) -> bool {
        self.cron_secret_token.is_some()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
