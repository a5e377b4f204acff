//! Appliance nameplate ratings used to weight energy allocation.

/// Fixed name → wattage lookup table.
pub mod catalog;

pub use catalog::{ApplianceCatalog, ApplianceRating, BUILTIN_RATINGS};
