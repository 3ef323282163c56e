//! Application facade: validation → store → aggregation / filtering / export.
//!
//! Each write is a single store call. Validation failures never reach the
//! store; store failures are returned once and not retried.

use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{info, warn};

use medistock_core::TransactionId;
use medistock_inventory::{
    BucketOrder, Catalog, CsvExport, HistoryOrder, InventoryItem, InventorySummary, Transaction,
    TransactionDraft, TransactionFilter, TransactionValidationError, aggregate_with, export_csv,
    export_file_name, order_history, validate_edit, validate_new,
};

use crate::store::{StoreError, Subscription, TransactionStore};

/// Live-update channel failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The store side of the subscription is gone. Callers must subscribe
    /// again; nothing reconnects automatically.
    #[error("inventory feed disconnected")]
    Disconnected,

    #[error("no snapshot within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] TransactionValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

pub struct InventoryService<S> {
    store: S,
    catalog: Catalog,
}

impl<S> InventoryService<S>
where
    S: TransactionStore,
{
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and store a new movement dated now.
    pub fn record(&self, draft: &TransactionDraft) -> Result<Transaction, ServiceError> {
        let tx = validate_new(draft, &self.catalog, Utc::now()).inspect_err(|e| {
            warn!(material = %draft.material, error = %e, "rejected new transaction");
        })?;

        match self.store.create(tx) {
            Ok(stored) => {
                info!(
                    id = %stored.id,
                    bucket = %stored.bucket_key(),
                    kind = %stored.kind,
                    quantity = stored.quantity,
                    "transaction recorded"
                );
                Ok(stored)
            }
            Err(e) => {
                warn!(error = %e, "failed to record transaction");
                Err(e.into())
            }
        }
    }

    /// Replace an existing movement. Its id and date are kept.
    pub fn edit(
        &self,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> Result<Transaction, ServiceError> {
        let existing = self.store.get(id)?.ok_or(StoreError::NotFound(id))?;
        let tx = validate_edit(draft, &existing, &self.catalog).inspect_err(|e| {
            warn!(id = %id, error = %e, "rejected transaction edit");
        })?;

        match self.store.update(tx) {
            Ok(stored) => {
                info!(id = %stored.id, bucket = %stored.bucket_key(), "transaction updated");
                Ok(stored)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "failed to update transaction");
                Err(e.into())
            }
        }
    }

    pub fn remove(&self, id: TransactionId) -> Result<(), ServiceError> {
        match self.store.delete(id) {
            Ok(()) => {
                info!(id = %id, "transaction deleted");
                Ok(())
            }
            Err(e) => {
                warn!(id = %id, error = %e, "failed to delete transaction");
                Err(e.into())
            }
        }
    }

    /// History view: newest first, then filtered.
    pub fn history(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, ServiceError> {
        let mut txs = self.store.list()?;
        order_history(&mut txs, HistoryOrder::NewestFirst);
        Ok(filter.apply(&txs))
    }

    pub fn inventory(&self, order: BucketOrder) -> Result<Vec<InventoryItem>, ServiceError> {
        let txs = self.store.list()?;
        Ok(aggregate_with(&txs, order))
    }

    pub fn summary(&self, threshold: i64) -> Result<InventorySummary, ServiceError> {
        let items = self.inventory(BucketOrder::FirstSeen)?;
        Ok(InventorySummary::from_items(&items, threshold))
    }

    /// Filtered history rendered as CSV, named after `today`.
    pub fn export(
        &self,
        filter: &TransactionFilter,
        today: NaiveDate,
    ) -> Result<CsvExport, ServiceError> {
        let rows = self.history(filter)?;
        let export = CsvExport {
            file_name: export_file_name(today),
            content: export_csv(&rows),
        };
        info!(file = %export.file_name, rows = rows.len(), "history exported");
        Ok(export)
    }

    /// Follow the store: the newest pushed snapshot is re-aggregated in full.
    pub fn watch(&self, order: BucketOrder) -> Result<InventoryFeed, ServiceError> {
        let subscription = self.store.subscribe()?;
        Ok(InventoryFeed { subscription, order })
    }
}

/// Inventory levels recomputed from the latest store snapshot.
///
/// Writes made between two reads collapse into one snapshot, so a reader
/// always gets current levels and never works through a backlog.
#[derive(Debug)]
pub struct InventoryFeed {
    subscription: Subscription<Vec<Transaction>>,
    order: BucketOrder,
}

impl InventoryFeed {
    /// Block until a snapshot newer than the last one read is available.
    pub fn recv(&self) -> Result<Vec<InventoryItem>, FeedError> {
        let snapshot = self.subscription.recv().map_err(|_| FeedError::Disconnected)?;
        Ok(aggregate_with(&snapshot, self.order))
    }

    pub fn next(&self, timeout: Duration) -> Result<Vec<InventoryItem>, FeedError> {
        match self.subscription.recv_timeout(timeout) {
            Ok(snapshot) => Ok(aggregate_with(&snapshot, self.order)),
            Err(RecvTimeoutError::Timeout) => Err(FeedError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(FeedError::Disconnected),
        }
    }

    /// Non-blocking: `Ok(None)` when nothing was written since the last read.
    pub fn try_next(&self) -> Result<Option<Vec<InventoryItem>>, FeedError> {
        match self.subscription.try_recv() {
            Ok(snapshot) => Ok(Some(aggregate_with(&snapshot, self.order))),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                warn!("inventory feed disconnected");
                Err(FeedError::Disconnected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use medistock_inventory::{MovementType, TypeFilter};

    use crate::store::InMemoryTransactionStore;

    fn service() -> InventoryService<Arc<InMemoryTransactionStore>> {
        InventoryService::new(Arc::new(InMemoryTransactionStore::new()), Catalog::default())
    }

    fn draft(
        material: &str,
        subtype: Option<&str>,
        kind: MovementType,
        qty: &str,
    ) -> TransactionDraft {
        TransactionDraft {
            kind,
            material: material.to_string(),
            subtype: subtype.map(str::to_string),
            batch_number: "lt-01".to_string(),
            origin_or_destination: "almacén general".to_string(),
            quantity: qty.to_string(),
            observations: None,
        }
    }

    #[test]
    fn validation_failure_never_reaches_store() {
        let svc = service();
        let err = svc
            .record(&draft("laminillas", None, MovementType::Ingreso, "0"))
            .unwrap_err();
        assert_eq!(err, ServiceError::Validation(TransactionValidationError::InvalidQuantity));
        assert!(svc.store().list().unwrap().is_empty());
    }

    #[test]
    fn record_then_inventory() {
        let svc = service();
        svc.record(&draft("laminillas", None, MovementType::Ingreso, "20")).unwrap();
        svc.record(&draft("laminillas", None, MovementType::Salida, "5")).unwrap();
        svc.record(&draft("pruebas-rapidas", Some("Hepatitis B"), MovementType::Ingreso, "5"))
            .unwrap();

        let mut items = svc.inventory(BucketOrder::Alphabetical).unwrap();
        let pairs: Vec<_> = items
            .drain(..)
            .map(|i| (i.material_name, i.total_quantity))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Laminillas".to_string(), 15),
                ("Pruebas Rápidas (Hepatitis B)".to_string(), 5),
            ]
        );

        let summary = svc.summary(10).unwrap();
        assert_eq!(summary.total_units, 20);
        assert_eq!(summary.active_materials, 2);
        assert_eq!(summary.low_stock.len(), 1);
    }

    #[test]
    fn edit_keeps_identity_and_rejects_unknown_ids() {
        let svc = service();
        let original = svc
            .record(&draft("citobrush", None, MovementType::Ingreso, "8"))
            .unwrap();

        let mut d = TransactionDraft::from_transaction(&original);
        d.quantity = "12".to_string();
        let edited = svc.edit(original.id, &d).unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.date, original.date);
        assert_eq!(svc.inventory(BucketOrder::FirstSeen).unwrap()[0].total_quantity, 12);

        let missing = TransactionId::new();
        assert_eq!(
            svc.edit(missing, &d).unwrap_err(),
            ServiceError::Store(StoreError::NotFound(missing))
        );
    }

    #[test]
    fn remove_reports_missing_records() {
        let svc = service();
        let t = svc.record(&draft("citobrush", None, MovementType::Ingreso, "8")).unwrap();
        svc.remove(t.id).unwrap();
        assert_eq!(
            svc.remove(t.id).unwrap_err(),
            ServiceError::Store(StoreError::NotFound(t.id))
        );
    }

    #[test]
    fn history_filters_newest_first() {
        let svc = service();
        let first = svc
            .record(&draft("citobrush", None, MovementType::Ingreso, "8"))
            .unwrap();
        let second = svc
            .record(&draft("laminillas", None, MovementType::Salida, "2"))
            .unwrap();

        let all = svc.history(&TransactionFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].date >= all[1].date);

        let outflows = svc
            .history(&TransactionFilter::new().with_type(TypeFilter::Only(MovementType::Salida)))
            .unwrap();
        assert_eq!(outflows, vec![second]);

        let search = svc.history(&TransactionFilter::new().with_search("cito")).unwrap();
        assert_eq!(search, vec![first]);
    }

    #[test]
    fn export_names_file_and_renders_rows() {
        let svc = service();
        svc.record(&draft("laminillas", None, MovementType::Ingreso, "20")).unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let export = svc.export(&TransactionFilter::default(), today).unwrap();
        assert_eq!(export.file_name, "inventario_export_2024-05-10.csv");
        assert_eq!(export.content.lines().count(), 2);
        assert!(
            export
                .content
                .contains(",INGRESO,Laminillas,N/A,LT-01,ALMACÉN GENERAL,20,\"\"")
        );
    }

    #[test]
    fn feed_recomputes_on_every_snapshot() {
        let svc = service();
        let feed = svc.watch(BucketOrder::FirstSeen).unwrap();
        assert!(feed.try_next().unwrap().unwrap().is_empty());
        assert!(feed.try_next().unwrap().is_none());

        svc.record(&draft("laminillas", None, MovementType::Ingreso, "20")).unwrap();
        let items = feed.next(Duration::from_secs(1)).unwrap();
        assert_eq!(items[0].total_quantity, 20);

        svc.record(&draft("laminillas", None, MovementType::Salida, "25")).unwrap();
        let items = feed.next(Duration::from_secs(1)).unwrap();
        assert_eq!(items[0].total_quantity, -5);

        assert_eq!(
            feed.next(Duration::from_millis(10)).unwrap_err(),
            FeedError::Timeout(Duration::from_millis(10))
        );
    }

    #[test]
    fn late_reader_gets_current_levels_not_a_backlog() {
        let svc = service();
        let feed = svc.watch(BucketOrder::FirstSeen).unwrap();
        for _ in 0..200 {
            svc.record(&draft("laminillas", None, MovementType::Ingreso, "1"))
                .unwrap();
        }

        let items = feed.try_next().unwrap().unwrap();
        assert_eq!(items[0].total_quantity, 200);
        assert!(feed.try_next().unwrap().is_none());
        assert_eq!(
            feed.next(Duration::from_millis(10)).unwrap_err(),
            FeedError::Timeout(Duration::from_millis(10))
        );
    }

    #[test]
    fn feed_reports_disconnect_when_store_is_gone() {
        let store = InMemoryTransactionStore::new();
        let svc = InventoryService::new(store, Catalog::default());
        let feed = svc.watch(BucketOrder::FirstSeen).unwrap();
        drop(svc);

        assert!(feed.recv().unwrap().is_empty());
        assert_eq!(feed.try_next().unwrap_err(), FeedError::Disconnected);
    }
}
