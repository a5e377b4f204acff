//! Proportional energy allocation across appliance line items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::appliances::ApplianceCatalog;

/// One requested line item: an appliance type and how many of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplianceLine {
    /// Appliance type name, looked up in the catalog.
    pub name: String,
    /// Number of units of this appliance.
    pub quantity: u32,
}

impl ApplianceLine {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Input to [`allocate`]: ordered line items plus the metered total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Line items in display order. Names may repeat.
    pub lines: Vec<ApplianceLine>,
    /// Total metered energy to split (kWh in the dashboard, any unit here).
    pub total_energy: f64,
}

impl AllocationRequest {
    /// Builds a request from `(name, quantity)` pairs.
    pub fn new<I, S>(lines: I, total_energy: f64) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|(name, quantity)| ApplianceLine::new(name, quantity))
                .collect(),
            total_energy,
        }
    }
}

/// One line of an allocation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedLine {
    pub name: String,
    pub quantity: u32,
    /// Portion of the total energy attributed to this line.
    pub share: f64,
}

/// Output of [`allocate`], in the same order and cardinality as the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    pub lines: Vec<AllocatedLine>,
    /// The metered total the shares were reconciled against.
    pub total_energy: f64,
}

impl AllocationResult {
    /// Sums the shares in line order.
    pub fn allocated_total(&self) -> f64 {
        self.lines.iter().map(|l| l.share).sum()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reasons a form submission is refused before allocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("select at least one appliance")]
    NoAppliances,
    #[error("quantity for \"{name}\" must be at least 1")]
    ZeroQuantity { name: String },
    #[error("total energy must be a finite number >= 0, got {0}")]
    InvalidTotal(f64),
}

/// Checks a user-submitted request before it reaches [`allocate`].
///
/// [`allocate`] itself accepts anything; callers that take input from users
/// run this first.
///
/// # Errors
///
/// Returns the first problem found: no lines, a zero quantity, or a negative
/// or non-finite total.
pub fn check_request(request: &AllocationRequest) -> Result<(), RequestError> {
    if request.lines.is_empty() {
        return Err(RequestError::NoAppliances);
    }
    if let Some(line) = request.lines.iter().find(|l| l.quantity == 0) {
        return Err(RequestError::ZeroQuantity {
            name: line.name.clone(),
        });
    }
    if !request.total_energy.is_finite() || request.total_energy < 0.0 {
        return Err(RequestError::InvalidTotal(request.total_energy));
    }
    Ok(())
}

/// Splits `request.total_energy` across line items by nameplate power draw.
///
/// Each line is weighted by `wattage(name) * quantity`, with unknown names
/// weighing 0. Shares are `weight / total_weight * total_energy`, computed in
/// input order. The residual `total_energy - Σ shares` is then added to the
/// **last** line so the shares reconcile to the metered total.
///
/// When every weight is zero the proportions are all 0, so the residual
/// correction places the entire total on the last line. An empty request
/// yields an empty result. Inputs are not validated: zero quantities and
/// negative totals flow through the same arithmetic.
///
/// # Arguments
///
/// * `catalog` - Nameplate wattage lookup
/// * `request` - Ordered line items and the metered total
///
/// # Returns
///
/// An `AllocationResult` with one entry per request line, quantities
/// unchanged.
pub fn allocate(catalog: &ApplianceCatalog, request: &AllocationRequest) -> AllocationResult {
    let weights: Vec<u64> = request
        .lines
        .iter()
        .map(|line| u64::from(catalog.wattage(&line.name)) * u64::from(line.quantity))
        .collect();
    let total_weight: u64 = weights.iter().sum();

    let mut accumulated = 0.0_f64;
    let mut lines: Vec<AllocatedLine> = request
        .lines
        .iter()
        .zip(&weights)
        .map(|(line, &weight)| {
            let proportion = if total_weight == 0 {
                0.0
            } else {
                weight as f64 / total_weight as f64
            };
            let share = proportion * request.total_energy;
            accumulated += share;
            AllocatedLine {
                name: line.name.clone(),
                quantity: line.quantity,
                share,
            }
        })
        .collect();

    if let Some(last) = lines.last_mut() {
        last.share += request.total_energy - accumulated;
    }

    AllocationResult {
        lines,
        total_energy: request.total_energy,
    }
}
