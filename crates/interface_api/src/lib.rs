//! HTTP API Layer
//!
//! A thin Axum surface over the order and billing services.
//!
//! # Architecture
//!
//! - **Handlers**: order creation and lookup, patient order history, billing,
//!   copayment status, health
//! - **Middleware**: JWT authentication, audit logging
//! - **DTOs**: request and response bodies
//! - **Error Handling**: domain errors mapped to status codes with a JSON body
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::postgres(pool, config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use core_kernel::{HealthCheckable, SharedClock, SystemClock};
use domain_billing::{BillingCalculator, BillingService};
use domain_orders::{OrderAggregator, OrderNumberAllocator, OrderNumberSpace, OrderingConfig};
use infra_db::adapters::{
    PostgresCopaymentLedger, PostgresInventoryAdapter, PostgresInvoiceStore, PostgresOrderStore,
    PostgresPatientAdapter, PostgresStaffAdapter,
};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{billing, health, orders};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orders: Arc<OrderAggregator>,
    pub billing: Arc<BillingService>,
    /// Adapters consulted by the readiness probe
    pub probes: Arc<Vec<Arc<dyn HealthCheckable>>>,
}

impl AppState {
    pub fn new(config: ApiConfig, orders: Arc<OrderAggregator>, billing: Arc<BillingService>) -> Self {
        Self {
            config,
            orders,
            billing,
            probes: Arc::new(Vec::new()),
        }
    }

    /// Adds an adapter to the readiness probe
    pub fn with_probe(mut self, probe: Arc<dyn HealthCheckable>) -> Self {
        Arc::make_mut(&mut self.probes).push(probe);
        self
    }

    /// Wires the services onto PostgreSQL adapters
    pub fn postgres(pool: PgPool, config: ApiConfig) -> Result<Self, ApiError> {
        let policy = config.billing.policy()?;
        let space = OrderNumberSpace::new(config.order_number_capacity)?;
        let clock: SharedClock = Arc::new(SystemClock);

        let patients = Arc::new(PostgresPatientAdapter::new(pool.clone()));
        let staff = Arc::new(PostgresStaffAdapter::new(pool.clone()));
        let inventory = Arc::new(PostgresInventoryAdapter::new(pool.clone()));
        let order_store = Arc::new(PostgresOrderStore::new(pool.clone()));
        let ledger = Arc::new(PostgresCopaymentLedger::new(pool.clone(), policy.currency()));
        let invoices = Arc::new(PostgresInvoiceStore::new(pool));

        let allocator = Arc::new(OrderNumberAllocator::new(order_store.clone(), space));
        let ordering = OrderingConfig {
            currency: policy.currency(),
            timezone: config.timezone,
        };
        let orders = Arc::new(OrderAggregator::new(
            patients.clone(),
            staff.clone(),
            inventory,
            order_store.clone(),
            allocator,
            clock.clone(),
            ordering,
        ));

        let calculator = Arc::new(BillingCalculator::new(
            patients,
            ledger,
            policy,
            clock,
            config.timezone,
        ));
        let billing = Arc::new(BillingService::new(staff, order_store.clone(), invoices, calculator));

        Ok(Self::new(config, orders, billing).with_probe(order_store))
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let order_routes = Router::new()
        .route("/", post(orders::create_order))
        .route("/:number", get(orders::get_order));

    let billing_routes = Router::new()
        .route("/orders/:number", post(billing::bill_order))
        .route("/orders/:number", get(billing::get_invoice));

    let patient_routes = Router::new()
        .route("/:id/orders", get(orders::list_patient_orders))
        .route("/:id/copayments/:year", get(billing::copayment_status));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/orders", order_routes)
        .nest("/billing", billing_routes)
        .nest("/patients", patient_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
