use std::sync::RwLock;

use tracing::warn;

use medistock_core::TransactionId;
use medistock_inventory::Transaction;

use super::r#trait::{StoreError, TransactionStore, records};
use super::subscription::{SnapshotBroadcaster, Subscription};

/// In-memory transaction store.
///
/// Intended for tests/dev. Snapshots are published while the write lock is
/// held, so subscribers observe writes in commit order.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    records: RwLock<Vec<Transaction>>,
    broadcaster: SnapshotBroadcaster<Vec<Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records (kept in the given order).
    pub fn with_records(records: Vec<Transaction>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(Transaction::normalized).collect()),
            broadcaster: SnapshotBroadcaster::default(),
        }
    }

    fn write<T>(
        &self,
        op: impl FnOnce(&mut Vec<Transaction>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let out = op(&mut records)?;
        // The write is applied; a failed publish only leaves subscribers behind.
        if let Err(e) = self.broadcaster.publish(&records) {
            warn!(error = %e, "snapshot publish failed after write");
        }
        Ok(out)
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.clone())
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.iter().find(|t| t.id == id).cloned())
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
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        self.broadcaster.subscribe(records.clone())
    }
}
