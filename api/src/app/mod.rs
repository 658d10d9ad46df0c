//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and repository ports.

pub mod establishment_service;
pub mod menu_service;
pub mod order_service;
pub mod status_service;
pub mod subscription_service;

pub use establishment_service::EstablishmentService;
pub use menu_service::{MenuCategory, MenuService, PublicMenu};
pub use order_service::{OrderService, OrderTracking, PlaceOrder, PlaceOrderItem};
pub use status_service::{EstablishmentStatus, StatusRefreshReport, StatusService};
pub use subscription_service::{PlanInfo, SubscriptionService};

use crate::domain::entities::{Establishment, EstablishmentId};
use crate::domain::ports::EstablishmentRepository;
use crate::error::AppError;

/// Load an establishment on behalf of a merchant.
///
/// Missing establishments are 404, someone else's are 403.
pub(crate) async fn load_owned<ER>(
    repo: &ER,
    id: &EstablishmentId,
    owner_id: &str,
) -> Result<Establishment, AppError>
where
    ER: EstablishmentRepository + ?Sized,
{
    let est = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Establishment {} not found", id)))?;

    if !est.is_owned_by(owner_id) {
        return Err(AppError::Forbidden(
            "Establishment belongs to another merchant".to_string(),
        ));
    }
    Ok(est)
}
