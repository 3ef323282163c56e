//! Derivation of current stock levels from the movement history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Derived stock level for one bucket (material, or material + subtype).
///
/// Never stored; recomputed from the full history whenever it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Bucket key (see [`Transaction::bucket_key`]).
    pub material_name: String,
    /// Inflows minus outflows. May be negative.
    pub total_quantity: i64,
    /// Latest `date` among the contributing movements.
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.total_quantity < threshold
    }

    /// Compact label for charts.
    pub fn short_label(&self) -> String {
        self.material_name.replace("Pruebas Rápidas", "P.R.")
    }
}

/// Output order of aggregated buckets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    /// Order in which each bucket key first appears in the input.
    #[default]
    FirstSeen,
    /// Bucket key, ascending (byte order).
    Alphabetical,
}

/// Fold movements into per-bucket stock levels, in first-seen order.
pub fn aggregate<'a, I>(transactions: I) -> Vec<InventoryItem>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    aggregate_with(transactions, BucketOrder::FirstSeen)
}

/// Fold movements into per-bucket stock levels.
///
/// Totals do not depend on input order; `last_updated` is the maximum `date`
/// by value, not the last processed record.
pub fn aggregate_with<'a, I>(transactions: I, order: BucketOrder) -> Vec<InventoryItem>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<InventoryItem> = Vec::new();

    for tx in transactions {
        let key = tx.bucket_key();
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                items.push(InventoryItem {
                    material_name: key.clone(),
                    total_quantity: 0,
                    last_updated: tx.date,
                });
                index.insert(key, items.len() - 1);
                items.len() - 1
            }
        };

        let item = &mut items[slot];
        item.total_quantity += tx.signed_quantity();
        if tx.date > item.last_updated {
            item.last_updated = tx.date;
        }
    }

    if order == BucketOrder::Alphabetical {
        items.sort_by(|a, b| a.material_name.cmp(&b.material_name));
    }

    items
}
