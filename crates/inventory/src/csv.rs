//! CSV export of the movement history.
//!
//! Fields are comma-joined as-is: values containing commas or quotes are not
//! escaped. `observations` is wrapped in double quotes, but embedded quotes
//! are left untouched.

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

pub const CSV_HEADERS: [&str; 9] = [
    "ID",
    "Fecha",
    "Tipo",
    "Material",
    "Subtipo",
    "Lote",
    "Origen/Destino",
    "Cantidad",
    "Observaciones",
];

const DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// A rendered export, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

/// `inventario_export_<YYYY-MM-DD>.csv`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("inventario_export_{}.csv", today.format("%Y-%m-%d"))
}

/// Render movements with dates in the host's local time zone.
pub fn export_csv(transactions: &[Transaction]) -> String {
    export_csv_in(transactions, &Local)
}

pub fn export_csv_in<Tz>(transactions: &[Transaction], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: core::fmt::Display,
{
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for tx in transactions {
        let row = [
            tx.id.to_string(),
            tx.date.with_timezone(tz).format(DATE_FORMAT).to_string(),
            tx.kind.to_string(),
            tx.material_name.clone(),
            tx.subtype.clone().unwrap_or_else(|| "N/A".to_string()),
            tx.batch_number.clone(),
            tx.origin_or_destination.clone(),
            tx.quantity.to_string(),
            format!("\"{}\"", tx.observations.as_deref().unwrap_or_default()),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}
