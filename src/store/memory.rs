use std::collections::HashMap;
use std::sync::Mutex;

use super::{ConsumptionRow, RecordStore, StoreError, UserRecord};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    consumption: HashMap<String, Vec<ConsumptionRow>>,
}

/// In-process record store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn upsert_user(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        tables.users.insert(user.user_id.clone(), user);
        Ok(())
    }

    fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.users.get(user_id).cloned())
    }

    fn append_rows(&self, user_id: &str, rows: &[ConsumptionRow]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        tables
            .consumption
            .entry(user_id.to_string())
            .or_default()
            .extend_from_slice(rows);
        Ok(())
    }

    fn query_rows(&self, user_id: &str) -> Result<Vec<ConsumptionRow>, StoreError> {
        let tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .consumption
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}
