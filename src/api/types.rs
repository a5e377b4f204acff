//! API request and response bodies.

use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationRequest, ApplianceLine};
use crate::report::{ChartBar, UsageReport};
use crate::store::ConsumptionRow;

/// Body of `/register` and `/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub user_id: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    pub user_id: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `/allocate`: selected appliances and the meter reading.
#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    /// Selected appliances with quantities, in display order.
    pub appliances: Vec<ApplianceLine>,
    /// Total EB reading in kWh.
    pub total_energy: f64,
}

impl From<AllocateRequest> for AllocationRequest {
    fn from(r: AllocateRequest) -> Self {
        Self {
            lines: r.appliances,
            total_energy: r.total_energy,
        }
    }
}

/// Result of `/allocate`: the usage report plus its chart series.
#[derive(Debug, Serialize)]
pub struct AllocateResponse {
    #[serde(flatten)]
    pub report: UsageReport,
    /// Horizontal bar chart data keyed by appliance name.
    pub chart: Vec<ChartBar>,
}

/// Previously recorded allocations for the logged-in user.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub rows: Vec<ConsumptionRow>,
    pub chart: Vec<ChartBar>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
