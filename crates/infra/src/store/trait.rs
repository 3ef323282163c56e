use std::sync::Arc;

use thiserror::Error;

use medistock_core::{DomainError, TransactionId};
use medistock_inventory::Transaction;

use super::subscription::Subscription;

/// Storage failure for a single operation.
///
/// Nothing is applied when an operation fails; callers report it once and do
/// not retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("transaction {0} not found")]
    NotFound(TransactionId),

    #[error("transaction {0} already exists")]
    AlreadyExists(TransactionId),

    #[error("storage io error: {0}")]
    Io(String),

    #[error("storage serialization error: {0}")]
    Serialization(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => DomainError::not_found(),
            StoreError::AlreadyExists(id) => {
                DomainError::conflict(format!("transaction {id} already exists"))
            }
            other => DomainError::conflict(other.to_string()),
        }
    }
}

/// Backing store for the movement history.
///
/// The store is the only source of truth; inventory levels are always
/// recomputed from [`TransactionStore::list`] or a pushed snapshot.
///
/// Implementations normalize `batch_number` and `origin_or_destination`
/// (trim + uppercase) on every write.
pub trait TransactionStore: Send + Sync {
    /// Full collection, newest record first (insertion order).
    fn list(&self) -> Result<Vec<Transaction>, StoreError>;

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Insert a new record at the front of the collection.
    fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError>;

    /// Replace the record with the same id, in place.
    fn update(&self, transaction: Transaction) -> Result<Transaction, StoreError>;

    fn delete(&self, id: TransactionId) -> Result<(), StoreError>;

    /// Subscribe to full snapshots: the current one immediately, then a new
    /// one after every successful write. Unread snapshots are replaced by
    /// newer ones.
    fn subscribe(&self) -> Result<Subscription<Vec<Transaction>>, StoreError>;
}

impl<S> TransactionStore for Arc<S>
where
    S: TransactionStore + ?Sized,
{
    fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        (**self).list()
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).get(id)
    }

    fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        (**self).create(transaction)
    }

    fn update(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        (**self).update(transaction)
    }

    fn delete(&self, id: TransactionId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn subscribe(&self) -> Result<Subscription<Vec<Transaction>>, StoreError> {
        (**self).subscribe()
    }
}

impl<S> TransactionStore for Box<S>
where
    S: TransactionStore + ?Sized,
{
    fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        (**self).list()
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).get(id)
    }

    fn create(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        (**self).create(transaction)
    }

    fn update(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        (**self).update(transaction)
    }

    fn delete(&self, id: TransactionId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn subscribe(&self) -> Result<Subscription<Vec<Transaction>>, StoreError> {
        (**self).subscribe()
    }
}

/// Collection edits shared by every store implementation.
pub(crate) mod records {
    use super::*;

    pub(crate) fn insert_front(
        records: &mut Vec<Transaction>,
        transaction: Transaction,
    ) -> Result<Transaction, StoreError> {
        if records.iter().any(|t| t.id == transaction.id) {
            return Err(StoreError::AlreadyExists(transaction.id));
        }
        let normalized = transaction.normalized();
        records.insert(0, normalized.clone());
        Ok(normalized)
    }

    pub(crate) fn replace(
        records: &mut [Transaction],
        transaction: Transaction,
    ) -> Result<Transaction, StoreError> {
        let slot = records
            .iter_mut()
            .find(|t| t.id == transaction.id)
            .ok_or(StoreError::NotFound(transaction.id))?;
        let normalized = transaction.normalized();
        *slot = normalized.clone();
        Ok(normalized)
    }

    pub(crate) fn remove(
        records: &mut Vec<Transaction>,
        id: TransactionId,
    ) -> Result<(), StoreError> {
        let before = records.len();
        records.retain(|t| t.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
