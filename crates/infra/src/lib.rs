//! Infrastructure layer: storage adapters, live snapshots, config, and the
//! application service that ties them to the inventory domain.

pub mod config;
pub mod service;
pub mod store;


pub use config::{InventoryConfig, StoreBackend, open_store};
pub use service::{FeedError, InventoryFeed, InventoryService, ServiceError};
pub use store::{
    InMemoryTransactionStore, JsonFileTransactionStore, StoreError, Subscription, TransactionStore,
};
