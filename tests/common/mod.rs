//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use smart_power::allocation::{AllocationRequest, AllocationResult, allocate};
use smart_power::appliances::ApplianceCatalog;
use smart_power::report::{ReportSettings, UsageReport};
use smart_power::store::{ConsumptionRow, MemoryStore, RecordStore};

/// Absolute tolerance for comparing summed shares against a total.
pub const EPS: f64 = 1e-6;

/// The built-in 15-appliance catalog.
pub fn default_catalog() -> ApplianceCatalog {
    ApplianceCatalog::builtin()
}

/// Allocates `total` across `(name, quantity)` lines with the built-in catalog.
pub fn allocate_lines(lines: &[(&str, u32)], total: f64) -> AllocationResult {
    allocate(
        &default_catalog(),
        &AllocationRequest::new(lines.iter().copied(), total),
    )
}

/// Report with default tariff and advice settings.
pub fn default_report(result: &AllocationResult) -> UsageReport {
    UsageReport::new(result, &ReportSettings::default())
}

/// A memory store already holding one allocation for `user_id`.
pub fn store_with_history(user_id: &str) -> MemoryStore {
    let store = MemoryStore::new();
    let result = allocate_lines(&[("Refrigerator", 1), ("Fan", 2)], 100.0);
    store
        .append_rows(user_id, &ConsumptionRow::from_result(&result))
        .expect("memory store append");
    store
}
