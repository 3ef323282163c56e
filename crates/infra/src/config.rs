//! Runtime configuration (environment driven).
//!
//! | Variable                        | Default                 |
//! |---------------------------------|-------------------------|
//! | `MEDISTOCK_STORE`               | `memory` (or `file`)    |
//! | `MEDISTOCK_DATA_PATH`           | `medistock_db_v1.json`  |
//! | `MEDISTOCK_LOW_STOCK_THRESHOLD` | `10`                    |
//!
//! Unparseable values are logged and replaced by the default.

use std::path::PathBuf;

use medistock_inventory::LOW_STOCK_THRESHOLD;

use crate::store::{
    DEFAULT_DATA_FILE, InMemoryTransactionStore, JsonFileTransactionStore, TransactionStore,
};

pub const STORE_VAR: &str = "MEDISTOCK_STORE";
pub const DATA_PATH_VAR: &str = "MEDISTOCK_DATA_PATH";
pub const LOW_STOCK_VAR: &str = "MEDISTOCK_LOW_STOCK_THRESHOLD";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    pub backend: StoreBackend,
    pub data_path: PathBuf,
    pub low_stock_threshold: i64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

impl InventoryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let backend = match lookup(STORE_VAR).as_deref().map(str::trim) {
            None | Some("") => defaults.backend,
            Some(v) if v.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Some(v) if v.eq_ignore_ascii_case("file") => StoreBackend::File,
            Some(other) => {
                tracing::warn!(
                    value = other,
                    "unknown {STORE_VAR}; falling back to in-memory store"
                );
                defaults.backend
            }
        };

        let data_path = lookup(DATA_PATH_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let low_stock_threshold = match lookup(LOW_STOCK_VAR) {
            None => defaults.low_stock_threshold,
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "invalid {LOW_STOCK_VAR}; using {LOW_STOCK_THRESHOLD}"
                );
                defaults.low_stock_threshold
            }),
        };

        Self {
            backend,
            data_path,
            low_stock_threshold,
        }
    }
}

/// Build the configured store.
pub fn open_store(config: &InventoryConfig) -> Box<dyn TransactionStore> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory transaction store");
            Box::new(InMemoryTransactionStore::new())
        }
        StoreBackend::File => {
            tracing::info!(path = %config.data_path.display(), "using json file transaction store");
            Box::new(JsonFileTransactionStore::new(config.data_path.clone()))
        }
    }
}
