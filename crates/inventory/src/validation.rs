//! Form-input validation for stock movements.
//!
//! Rules are checked in a fixed priority order and the first violation is
//! reported:
//!
//! 1. material is in the catalog
//! 2. a sub-variant is chosen when the material declares them
//! 3. batch number is non-blank and alphanumeric-plus-hyphen
//! 4. quantity parses as an integer greater than zero
//! 5. origin/destination is non-blank

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use medistock_core::{DomainError, TransactionId};

use crate::catalog::Catalog;
use crate::transaction::{MovementType, Transaction, normalize_code};

/// Raw form input for a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub kind: MovementType,
    /// Catalog id or display name.
    pub material: String,
    pub subtype: Option<String>,
    pub batch_number: String,
    pub origin_or_destination: String,
    /// Quantity as typed by the user.
    pub quantity: String,
    pub observations: Option<String>,
}

impl TransactionDraft {
    /// Pre-populate a draft from a stored record (edit form).
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            kind: tx.kind,
            material: tx.material_name.clone(),
            subtype: tx.subtype.clone(),
            batch_number: tx.batch_number.clone(),
            origin_or_destination: tx.origin_or_destination.clone(),
            quantity: tx.quantity.to_string(),
            observations: tx.observations.clone(),
        }
    }
}

/// First violated validation rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    #[error("material must be selected from the catalog")]
    UnknownMaterial,

    #[error("a subtype must be selected for '{material}'")]
    MissingSubtype { material: String },

    #[error("subtype '{subtype}' is not declared for '{material}'")]
    UnknownSubtype { material: String, subtype: String },

    #[error("batch number is required")]
    EmptyBatchNumber,

    #[error("batch number must contain only letters, digits and hyphens (no spaces)")]
    MalformedBatchNumber,

    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    #[error("{} is required", counterparty_label(.0))]
    EmptyOriginOrDestination(MovementType),
}

fn counterparty_label(kind: &MovementType) -> &'static str {
    match kind {
        MovementType::Ingreso => "origin",
        MovementType::Salida => "destination",
    }
}

impl From<TransactionValidationError> for DomainError {
    fn from(err: TransactionValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate a draft for a brand-new record: fresh id, `date = now`.
pub fn validate_new(
    draft: &TransactionDraft,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Result<Transaction, TransactionValidationError> {
    build(draft, catalog, TransactionId::new(), now)
}

/// Validate a draft replacing `existing`: id and date are preserved.
pub fn validate_edit(
    draft: &TransactionDraft,
    existing: &Transaction,
    catalog: &Catalog,
) -> Result<Transaction, TransactionValidationError> {
    build(draft, catalog, existing.id, existing.date)
}

fn build(
    draft: &TransactionDraft,
    catalog: &Catalog,
    id: TransactionId,
    date: DateTime<Utc>,
) -> Result<Transaction, TransactionValidationError> {
    let material = catalog
        .find(&draft.material)
        .ok_or(TransactionValidationError::UnknownMaterial)?;

    let subtype = if material.has_subtypes() {
        let chosen = draft.subtype.as_deref().map(str::trim).unwrap_or_default();
        if chosen.is_empty() {
            return Err(TransactionValidationError::MissingSubtype {
                material: material.name.clone(),
            });
        }
        let declared = material.find_subtype(chosen).ok_or_else(|| {
            TransactionValidationError::UnknownSubtype {
                material: material.name.clone(),
                subtype: chosen.to_string(),
            }
        })?;
        Some(declared.to_string())
    } else {
        None
    };

    let batch = draft.batch_number.trim();
    if batch.is_empty() {
        return Err(TransactionValidationError::EmptyBatchNumber);
    }
    if !is_valid_batch_number(batch) {
        return Err(TransactionValidationError::MalformedBatchNumber);
    }

    let quantity = parse_quantity(&draft.quantity)?;

    if draft.origin_or_destination.trim().is_empty() {
        return Err(TransactionValidationError::EmptyOriginOrDestination(draft.kind));
    }

    let observations = draft
        .observations
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string);

    Ok(Transaction {
        id,
        date,
        kind: draft.kind,
        material_name: material.name.clone(),
        subtype,
        batch_number: normalize_code(batch),
        origin_or_destination: normalize_code(&draft.origin_or_destination),
        quantity,
        observations,
    })
}

/// `^[A-Za-z0-9-]+$`
fn is_valid_batch_number(batch: &str) -> bool {
    !batch.is_empty() && batch.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn parse_quantity(raw: &str) -> Result<u32, TransactionValidationError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| TransactionValidationError::InvalidQuantity)?;
    if value <= 0 {
        return Err(TransactionValidationError::InvalidQuantity);
    }
    u32::try_from(value).map_err(|_| TransactionValidationError::InvalidQuantity)
}
