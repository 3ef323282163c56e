use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use medistock_core::TransactionId;
use medistock_inventory::Transaction;

use super::r#trait::{StoreError, TransactionStore, records};
use super::subscription::{SnapshotBroadcaster, Subscription};

/// Default file name for the persisted collection.
pub const DEFAULT_DATA_FILE: &str = "medistock_db_v1.json";

/// File-backed transaction store.
///
/// The whole collection lives in one JSON array. Every write rewrites the
/// file through a temporary sibling followed by a rename. A missing file is
/// an empty collection.
#[derive(Debug)]
pub struct JsonFileTransactionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
    broadcaster: SnapshotBroadcaster<Vec<Transaction>>,
}

impl JsonFileTransactionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
            broadcaster: SnapshotBroadcaster::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Transaction>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(format!("{}: {e}", self.path.display()))),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn save(&self, records: &[Transaction]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|e| StoreError::Io(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))
    }

    fn write<T>(
        &self,
        op: impl FnOnce(&mut Vec<Transaction>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.load()?;
        let out = op(&mut records)?;
        self.save(&records)?;
        // Persisted; a failed publish only leaves subscribers behind.
        if let Err(e) = self.broadcaster.publish(&records) {
            warn!(error = %e, path = %self.path.display(), "snapshot publish failed after write");
        }
        Ok(out)
    }
}

impl TransactionStore for JsonFileTransactionStore {
    fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        self.load()
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.list()?.into_iter().find(|t| t.id == id))
    }

    fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        self.write(|records| records::insert_front(records, transaction))
    }

    fn update(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        self.write(|records| records::replace(records, transaction))
    }

    fn delete(&self, id: TransactionId) -> Result<(), StoreError> {
        self.write(|records| records::remove(records, id))
    }

    fn subscribe(&self) -> Result<Subscription<Vec<Transaction>>, StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let snapshot = self.load()?;
        self.broadcaster.subscribe(snapshot)
    }
}
