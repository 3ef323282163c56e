//! Explicit ordering for the movement history view.

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Most recent `date` first.
    #[default]
    NewestFirst,
    OldestFirst,
    /// Keep the order the store returned.
    AsGiven,
}

/// Sort in place by `date`. Stable: equal dates keep their relative order.
pub fn order_history(transactions: &mut [Transaction], order: HistoryOrder) {
    match order {
        HistoryOrder::NewestFirst => transactions.sort_by(|a, b| b.date.cmp(&a.date)),
        HistoryOrder::OldestFirst => transactions.sort_by(|a, b| a.date.cmp(&b.date)),
        HistoryOrder::AsGiven => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::MovementType;
    use chrono::{Duration, TimeZone, Utc};
    use medistock_core::TransactionId;

    fn tx(batch: &str, days: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days),
            kind: MovementType::Ingreso,
            material_name: "Citobrush".to_string(),
            subtype: None,
            batch_number: batch.to_string(),
            origin_or_destination: "ALMACÉN".to_string(),
            quantity: 1,
            observations: None,
        }
    }

    fn batches(txs: &[Transaction]) -> Vec<&str> {
        txs.iter().map(|t| t.batch_number.as_str()).collect()
    }

    #[test]
    fn newest_first_is_stable() {
        let mut txs = vec![tx("A", 1), tx("B", 3), tx("C", 1), tx("D", 2)];
        order_history(&mut txs, HistoryOrder::NewestFirst);
        assert_eq!(batches(&txs), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn oldest_first_and_as_given() {
        let mut txs = vec![tx("A", 2), tx("B", 0), tx("C", 1)];
        order_history(&mut txs, HistoryOrder::AsGiven);
        assert_eq!(batches(&txs), vec!["A", "B", "C"]);

        order_history(&mut txs, HistoryOrder::OldestFirst);
        assert_eq!(batches(&txs), vec!["B", "C", "A"]);
    }
}
