//! Inventory domain module.
//!
//! This crate contains the business rules for stock movements, implemented
//! purely as deterministic domain logic (no IO, no storage):
//!
//! - [`validation`] turns raw form input into a normalized [`Transaction`]
//! - [`aggregation`] folds the movement history into per-material stock levels
//! - [`filter`] narrows the history for viewing and export
//! - [`csv`] renders the history as a comma-joined table

pub mod aggregation;
pub mod catalog;
pub mod csv;
pub mod filter;
pub mod history;
pub mod summary;
pub mod transaction;
pub mod validation;

pub use aggregation::{BucketOrder, InventoryItem, aggregate, aggregate_with};
pub use catalog::{Catalog, MaterialOption};
pub use csv::{CSV_HEADERS, CsvExport, export_csv, export_csv_in, export_file_name};
pub use filter::{TransactionFilter, TypeFilter};
pub use history::{HistoryOrder, order_history};
pub use summary::{InventorySummary, LOW_STOCK_THRESHOLD};
pub use transaction::{MovementType, Transaction};
pub use validation::{TransactionDraft, TransactionValidationError, validate_edit, validate_new};
