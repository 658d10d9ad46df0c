//! Krato API Server
//!
//! Backend for a restaurant digital-menu and order-management app. Data
//! lives in Appwrite; this service owns the business rules and keeps each
//! establishment's open/closed status in step with its weekly schedule.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono_tz::Tz;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    AppwriteCategoryRepository, AppwriteClientImpl, AppwriteEstablishmentRepository,
    AppwriteOrderRepository, AppwriteProductRepository, AppwriteSubscriptionRepository,
};
use app::{EstablishmentService, MenuService, OrderService, StatusService, SubscriptionService};
use config::Config;
use domain::ports::{
    AccountClient, CategoryRepository, EstablishmentRepository, OrderRepository,
    ProductRepository, SubscriptionRepository,
};

/// Repository handles the services are built from
#[derive(Clone)]
pub struct Repositories {
    pub establishments: Arc<dyn EstablishmentRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub establishment_service: Arc<EstablishmentService<dyn EstablishmentRepository>>,
    pub status_service: Arc<StatusService<dyn EstablishmentRepository>>,
    pub menu_service: Arc<
        MenuService<
            dyn EstablishmentRepository,
            dyn CategoryRepository,
            dyn ProductRepository,
            dyn SubscriptionRepository,
        >,
    >,
    pub order_service:
        Arc<OrderService<dyn EstablishmentRepository, dyn ProductRepository, dyn OrderRepository>>,
    pub subscription_service:
        Arc<SubscriptionService<dyn EstablishmentRepository, dyn SubscriptionRepository>>,
    pub accounts: Arc<dyn AccountClient>,
    pub cron_secret: Option<String>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        accounts: Arc<dyn AccountClient>,
        default_timezone: Tz,
        cron_secret: Option<String>,
    ) -> Self {
        Self {
            establishment_service: Arc::new(EstablishmentService::new(
                repos.establishments.clone(),
            )),
            status_service: Arc::new(StatusService::new(
                repos.establishments.clone(),
                default_timezone,
            )),
            menu_service: Arc::new(MenuService::new(
                repos.establishments.clone(),
                repos.categories,
                repos.products.clone(),
                repos.subscriptions.clone(),
            )),
            order_service: Arc::new(OrderService::new(
                repos.establishments.clone(),
                repos.products,
                repos.orders,
            )),
            subscription_service: Arc::new(SubscriptionService::new(
                repos.establishments,
                repos.subscriptions,
            )),
            accounts,
            cron_secret,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router.
///
/// `orders_per_minute` enables the per-IP limit on public order placement;
/// it needs the server to provide `ConnectInfo<SocketAddr>`.
pub fn build_router(state: AppState, orders_per_minute: Option<u32>) -> Router {
    let mut order_routes =
        Router::new().route("/establishments/:id/orders", post(handlers::place_order));

    if let Some(per_minute) = orders_per_minute.filter(|n| *n > 0) {
        let governor_config = GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_millisecond((60_000 / u64::from(per_minute)).max(1))
            .burst_size(per_minute)
            .finish();

        match governor_config {
            Some(config) => {
                order_routes = order_routes.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => tracing::warn!(per_minute, "Invalid order rate limit, limiter disabled"),
        }
    }

    // Scheduler endpoint, guarded by CRON_SECRET_TOKEN when configured
    let cron_routes = Router::new()
        .route(
            "/cron/establishment-status",
            get(handlers::refresh_statuses).post(handlers::refresh_statuses),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::cron_auth_middleware,
        ));

    // Merchant dashboard
    let admin_routes = Router::new()
        .route(
            "/establishments",
            get(handlers::list_my_establishments).post(handlers::create_establishment),
        )
        .route(
            "/establishments/:id",
            get(handlers::get_my_establishment)
                .patch(handlers::update_establishment)
                .delete(handlers::delete_establishment),
        )
        .route(
            "/establishments/:id/business-hours",
            put(handlers::set_business_hours),
        )
        .route(
            "/establishments/:id/manual-status",
            post(handlers::set_manual_status).delete(handlers::clear_manual_status),
        )
        .route(
            "/establishments/:id/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            patch(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/establishments/:id/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/:id",
            patch(handlers::update_product).delete(handlers::delete_product),
        )
        .route("/establishments/:id/orders", get(handlers::list_orders))
        .route("/orders/:id", get(handlers::get_order))
        .route("/orders/:id/status", patch(handlers::update_order_status))
        .route(
            "/establishments/:id/customers",
            get(handlers::list_customers),
        )
        .route(
            "/establishments/:id/subscription",
            get(handlers::get_subscription).post(handlers::subscribe),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::merchant_auth_middleware,
        ));

    Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        // Public endpoints
        .route("/establishments/:id", get(handlers::get_establishment))
        .route("/establishments/:id/status", get(handlers::get_status))
        .route("/menu/:slug", get(handlers::get_public_menu))
        .route("/orders/:id/status", get(handlers::track_order))
        .route("/subscriptions/plans", get(handlers::list_plans))
        .merge(order_routes)
        .merge(cron_routes)
        .nest("/admin", admin_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the reconciliation pass on a fixed period. Failures are logged and
/// the next tick tries again.
fn spawn_status_refresh(
    status_service: Arc<StatusService<dyn EstablishmentRepository>>,
    period: std::time::Duration,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = status_service.refresh_all().await {
                tracing::error!(error = %e, "Scheduled status refresh failed");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,krato_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Krato API...");

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;

    // Create adapters
    let appwrite = Arc::new(AppwriteClientImpl::new(
        config.appwrite_endpoint.clone(),
        config.appwrite_project_id.clone(),
        config.appwrite_api_key.clone(),
        config.appwrite_database_id.clone(),
    ));
    let collections = &config.collections;

    let repos = Repositories {
        establishments: Arc::new(AppwriteEstablishmentRepository::new(
            appwrite.clone(),
            collections.establishments.clone(),
        )),
        categories: Arc::new(AppwriteCategoryRepository::new(
            appwrite.clone(),
            collections.categories.clone(),
        )),
        products: Arc::new(AppwriteProductRepository::new(
            appwrite.clone(),
            collections.products.clone(),
        )),
        orders: Arc::new(AppwriteOrderRepository::new(
            appwrite.clone(),
            collections.orders.clone(),
        )),
        subscriptions: Arc::new(AppwriteSubscriptionRepository::new(
            appwrite.clone(),
            collections.subscriptions.clone(),
        )),
    };

    // Create app state
    let state = AppState::new(
        repos,
        appwrite,
        config.default_timezone,
        config.cron_secret_token.clone(),
    );

    if !config.cron_auth_enabled() {
        tracing::warn!("CRON_SECRET_TOKEN not set, status refresh endpoint is open");
    }

    if let Some(period) = config.status_refresh_interval {
        tracing::info!(every_secs = period.as_secs(), "In-process status refresh enabled");
        spawn_status_refresh(state.status_service.clone(), period);
    }

    let app = build_router(state, Some(config.order_rate_limit_per_minute));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
