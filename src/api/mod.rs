//! REST API for the energy dashboard.
//!
//! Endpoints:
//! - `GET /appliances`: catalog listing
//! - `POST /register`, `POST /login`, `POST /logout`: accounts and sessions
//! - `POST /allocate`: split a meter reading and record it
//! - `GET /history`, `GET /history.csv`: previously recorded allocations

mod error;
mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::appliances::ApplianceCatalog;
use crate::auth::{PasswordPolicy, SessionTable};
use crate::config::AppConfig;
use crate::report::ReportSettings;
use crate::store::{RecordStore, StoreError};

pub use error::ApiError;
pub use types::{
    AllocateRequest, AllocateResponse, CredentialsRequest, ErrorResponse, HistoryResponse,
    TokenResponse,
};

/// Application state shared across all request handlers.
///
/// The catalog and settings are read-only; the store and session table
/// guard their own mutable state.
pub struct AppState {
    /// Appliance wattage table.
    pub catalog: ApplianceCatalog,
    /// Credential and consumption persistence.
    pub store: Arc<dyn RecordStore>,
    /// Live login sessions.
    pub sessions: SessionTable,
    /// Tariff and advice settings for reports.
    pub report: ReportSettings,
    /// Registration password rules.
    pub policy: PasswordPolicy,
}

impl AppState {
    pub fn new(
        catalog: ApplianceCatalog,
        store: Arc<dyn RecordStore>,
        report: ReportSettings,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            catalog,
            store,
            sessions: SessionTable::new(),
            report,
            policy,
        }
    }

    /// Builds state from a validated configuration, opening its store.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the configured store cannot be opened.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, StoreError> {
        Ok(Self::new(
            cfg.catalog(),
            cfg.open_store()?,
            cfg.report_settings(),
            cfg.password_policy(),
        ))
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/appliances", get(handlers::list_appliances))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/allocate", post(handlers::allocate))
        .route("/history", get(handlers::history))
        .route("/history.csv", get(handlers::history_csv))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
