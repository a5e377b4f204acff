use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{ConsumptionRow, RecordStore, StoreError, UserRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    users: BTreeMap<String, UserRecord>,
    #[serde(default)]
    consumption: BTreeMap<String, Vec<ConsumptionRow>>,
}

/// Record store persisted as one JSON document.
///
/// The whole document is rewritten after every mutation, via a sibling
/// temporary file that is renamed over the original. A mutation only becomes
/// visible once that write has succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "creating new record store");
                Document::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, doc: &Document) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, doc)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "record store written");
        Ok(())
    }

    /// Applies `change` to a copy of the document and swaps it in after the
    /// copy has been written.
    fn commit(&self, change: impl FnOnce(&mut Document)) -> Result<(), StoreError> {
        let mut doc = self.doc.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = doc.clone();
        change(&mut next);
        self.persist(&next)?;
        *doc = next;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn upsert_user(&self, user: UserRecord) -> Result<(), StoreError> {
        self.commit(|doc| {
            doc.users.insert(user.user_id.clone(), user);
        })
    }

    fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let doc = self.doc.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(doc.users.get(user_id).cloned())
    }

    fn append_rows(&self, user_id: &str, rows: &[ConsumptionRow]) -> Result<(), StoreError> {
        self.commit(|doc| {
            doc.consumption
                .entry(user_id.to_string())
                .or_default()
                .extend_from_slice(rows);
        })
    }

    fn query_rows(&self, user_id: &str) -> Result<Vec<ConsumptionRow>, StoreError> {
        let doc = self.doc.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(doc.consumption.get(user_id).cloned().unwrap_or_default())
    }
}
