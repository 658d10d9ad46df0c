//! Request authentication
//!
//! Merchant sessions for the dashboard API and the shared secret that
//! guards the scheduler endpoint.

mod cron;
mod session;

pub use cron::cron_auth_middleware;
pub use session::merchant_auth_middleware;
