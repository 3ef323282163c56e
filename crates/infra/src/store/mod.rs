//! Storage boundary for the movement history.
//!
//! The inventory core never touches storage directly: callers read the full
//! collection (or subscribe to snapshots) and hand it to the pure domain
//! functions.

pub mod in_memory;
pub mod json_file;
pub mod subscription;
pub mod r#trait;

pub use in_memory::InMemoryTransactionStore;
pub use json_file::{DEFAULT_DATA_FILE, JsonFileTransactionStore};
pub use r#trait::{StoreError, TransactionStore};
pub use subscription::Subscription;
