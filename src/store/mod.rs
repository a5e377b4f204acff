//! Record store for user credentials and consumption history.
//!
//! The dashboard talks to persistence through [`RecordStore`] only. Two
//! backends are provided: [`MemoryStore`] for tests and throwaway sessions,
//! and [`JsonFileStore`] which keeps everything in a single JSON document.

mod json_file;
mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocation::AllocationResult;
use crate::auth::PasswordHash;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Stored account credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub password: PasswordHash,
}

/// One persisted allocation line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRow {
    /// Appliance type name.
    pub appliance: String,
    /// Number of units.
    pub quantity: u32,
    /// Energy attributed to this line.
    pub share_kwh: f64,
}

impl ConsumptionRow {
    /// Converts every line of an allocation result into a storable row.
    pub fn from_result(result: &AllocationResult) -> Vec<Self> {
        result
            .lines
            .iter()
            .map(|l| Self {
                appliance: l.name.clone(),
                quantity: l.quantity,
                share_kwh: l.share,
            })
            .collect()
    }
}

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Persistence operations the dashboard needs.
///
/// Implementations use interior mutability so a single store can be shared
/// behind an `Arc` by concurrent request handlers.
pub trait RecordStore: Send + Sync {
    /// Inserts a user, or replaces the credentials of an existing one.
    fn upsert_user(&self, user: UserRecord) -> Result<(), StoreError>;

    /// Looks up a user by id.
    fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Appends rows to a user's history, preserving their order.
    fn append_rows(&self, user_id: &str, rows: &[ConsumptionRow]) -> Result<(), StoreError>;

    /// Returns every row stored for `user_id` in insertion order.
    ///
    /// Unknown users have an empty history.
    fn query_rows(&self, user_id: &str) -> Result<Vec<ConsumptionRow>, StoreError>;

    fn user_exists(&self, user_id: &str) -> Result<bool, StoreError> {
        Ok(self.find_user(user_id)?.is_some())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::allocation::{AllocationRequest, allocate};
    use crate::appliances::ApplianceCatalog;

    pub(crate) fn row(appliance: &str, quantity: u32, share_kwh: f64) -> ConsumptionRow {
        ConsumptionRow {
            appliance: appliance.to_string(),
            quantity,
            share_kwh,
        }
    }

    pub(crate) fn user(id: &str) -> UserRecord {
        UserRecord {
            user_id: id.to_string(),
            password: PasswordHash::new(&[7u8; 16], "correct horse"),
        }
    }

    /// Behaviour every backend must share.
    pub(crate) fn exercise_store(store: &dyn RecordStore) {
        assert!(!store.user_exists("alice").unwrap());
        store.upsert_user(user("alice")).unwrap();
        assert!(store.user_exists("alice").unwrap());
        assert_eq!(store.find_user("alice").unwrap(), Some(user("alice")));

        assert!(store.query_rows("alice").unwrap().is_empty());
        store
            .append_rows("alice", &[row("Fan", 2, 10.0), row("TV", 1, 5.0)])
            .unwrap();
        store.append_rows("alice", &[row("Fan", 1, 3.0)]).unwrap();
        store.append_rows("bob", &[row("Oven", 1, 8.0)]).unwrap();

        let rows = store.query_rows("alice").unwrap();
        assert_eq!(
            rows,
            vec![row("Fan", 2, 10.0), row("TV", 1, 5.0), row("Fan", 1, 3.0)]
        );
        assert_eq!(store.query_rows("bob").unwrap(), vec![row("Oven", 1, 8.0)]);
        assert!(store.query_rows("carol").unwrap().is_empty());
    }

    #[test]
    fn rows_from_result_keep_order_and_duplicates() {
        let catalog = ApplianceCatalog::builtin();
        let result = allocate(
            &catalog,
            &AllocationRequest::new([("Refrigerator", 1), ("Fan", 2), ("Refrigerator", 1)], 90.0),
        );
        let rows = ConsumptionRow::from_result(&result);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].appliance, "Refrigerator");
        assert_eq!(rows[1].quantity, 2);
        assert_eq!(rows[2].appliance, "Refrigerator");
        let total: f64 = rows.iter().map(|r| r.share_kwh).sum();
        assert!((total - 90.0).abs() < 1e-9);
    }
}
