use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medistock_core::{DomainError, Entity, TransactionId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Inbound movement (increases stock).
    Ingreso,
    /// Outbound movement (decreases stock).
    Salida,
}

impl MovementType {
    /// +1 for inflows, -1 for outflows.
    pub fn sign(self) -> i64 {
        match self {
            MovementType::Ingreso => 1,
            MovementType::Salida => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementType::Ingreso => "INGRESO",
            MovementType::Salida => "SALIDA",
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INGRESO" => Ok(MovementType::Ingreso),
            "SALIDA" => Ok(MovementType::Salida),
            other => Err(DomainError::validation(format!("unknown movement type '{other}'"))),
        }
    }
}

/// A recorded stock movement.
///
/// Records are replaced as a whole on edit; the serialized shape is the
/// stored record schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MovementType,
    pub material_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub batch_number: String,
    pub origin_or_destination: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

impl Transaction {
    /// Inventory bucket this movement contributes to.
    ///
    /// A subtype opens its own bucket: `"{material} ({subtype})"`.
    pub fn bucket_key(&self) -> String {
        match self.subtype.as_deref() {
            Some(subtype) if !subtype.is_empty() => format!("{} ({})", self.material_name, subtype),
            _ => self.material_name.clone(),
        }
    }

    /// Signed stock delta: `+quantity` for inflows, `-quantity` for outflows.
    pub fn signed_quantity(&self) -> i64 {
        self.kind.sign() * i64::from(self.quantity)
    }

    /// Apply write-time normalization: batch number and origin/destination
    /// are trimmed and uppercased.
    pub fn normalized(mut self) -> Self {
        self.batch_number = normalize_code(&self.batch_number);
        self.origin_or_destination = normalize_code(&self.origin_or_destination);
        self
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

pub(crate) fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(kind: MovementType, subtype: Option<&str>) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            kind,
            material_name: "Pruebas Rápidas".to_string(),
            subtype: subtype.map(str::to_string),
            batch_number: "B2309-X".to_string(),
            origin_or_destination: "ALMACÉN".to_string(),
            quantity: 7,
            observations: None,
        }
    }

    #[test]
    fn bucket_key_includes_subtype_when_present() {
        assert_eq!(tx(MovementType::Ingreso, None).bucket_key(), "Pruebas Rápidas");
        assert_eq!(
            tx(MovementType::Ingreso, Some("Hepatitis B")).bucket_key(),
            "Pruebas Rápidas (Hepatitis B)"
        );
        assert_eq!(tx(MovementType::Ingreso, Some("")).bucket_key(), "Pruebas Rápidas");
    }

    #[test]
    fn signed_quantity_follows_movement_type() {
        assert_eq!(tx(MovementType::Ingreso, None).signed_quantity(), 7);
        assert_eq!(tx(MovementType::Salida, None).signed_quantity(), -7);
    }

    #[test]
    fn normalization_trims_and_uppercases_unicode() {
        let mut t = tx(MovementType::Ingreso, None);
        t.batch_number = "  l1 ".to_string();
        t.origin_or_destination = " almacén".to_string();
        let t = t.normalized();
        assert_eq!(t.batch_number, "L1");
        assert_eq!(t.origin_or_destination, "ALMACÉN");
    }

    #[test]
    fn movement_type_parses_case_insensitively() {
        assert_eq!("ingreso".parse::<MovementType>().unwrap(), MovementType::Ingreso);
        assert_eq!(" SALIDA ".parse::<MovementType>().unwrap(), MovementType::Salida);
        assert!("ENTRADA".parse::<MovementType>().is_err());
    }

    #[test]
    fn serializes_with_record_field_names() {
        let t = tx(MovementType::Salida, Some("Hepatitis C"));
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["type"], "SALIDA");
        assert_eq!(json["materialName"], "Pruebas Rápidas");
        assert_eq!(json["subtype"], "Hepatitis C");
        assert_eq!(json["batchNumber"], "B2309-X");
        assert_eq!(json["originOrDestination"], "ALMACÉN");
        assert_eq!(json["quantity"], 7);
        assert!(json.get("observations").is_none());

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
