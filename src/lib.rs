//! Household electricity dashboard: splits a metered energy total across
//! appliances by nameplate wattage and keeps a per-user usage history.

/// Proportional allocation with last-line residual correction.
pub mod allocation;
#[cfg(feature = "api")]
pub mod api;
pub mod appliances;
/// Registration, login, and bearer-token sessions.
pub mod auth;
pub mod cli;
pub mod config;
pub mod io;
pub mod logging;
pub mod report;
/// Credential and consumption persistence.
pub mod store;
#[cfg(feature = "tui")]
pub mod tui;
