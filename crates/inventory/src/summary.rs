//! Dashboard figures derived from aggregated stock levels.

use serde::{Deserialize, Serialize};

use crate::aggregation::InventoryItem;

/// Items with a total below this are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    /// Sum of all bucket totals (negative totals included).
    pub total_units: i64,
    /// Number of buckets.
    pub active_materials: usize,
    /// Buckets under the threshold, in input order.
    pub low_stock: Vec<InventoryItem>,
}

impl InventorySummary {
    pub fn from_items(items: &[InventoryItem], threshold: i64) -> Self {
        Self {
            total_units: items.iter().map(|i| i.total_quantity).sum(),
            active_materials: items.len(),
            low_stock: items
                .iter()
                .filter(|i| i.is_low_stock(threshold))
                .cloned()
                .collect(),
        }
    }
}
