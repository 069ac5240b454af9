//! Core types, constants, and pure validation for the CSV product import
//! pipeline.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).
//! It provides:
//!
//! - The required header schema and its lenient column resolution
//! - The raw per-row record type built by pairing header and row
//! - The record validator, with the vendor-existence check injected as a
//!   plain closure so it can be exercised without a live data store

use serde::Serialize;
use uuid::Uuid;

use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of validated records accumulated before a bulk insert is issued.
pub const IMPORT_BATCH_SIZE: usize = 500;

/// Maximum length of a product name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Columns that must all be present in the header row, in any order.
pub const REQUIRED_COLUMNS: &[&str] = &["vendor_id", "name", "description", "price", "stock"];

// ---------------------------------------------------------------------------
// Header schema
// ---------------------------------------------------------------------------

/// Resolved positions of the required columns within a CSV header row.
///
/// Column resolution is deliberately lenient: extra columns are ignored,
/// and a duplicated column name resolves to its last occurrence. The only
/// hard requirement is that every name in [`REQUIRED_COLUMNS`] appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSchema {
    vendor_id: usize,
    name: usize,
    description: usize,
    price: usize,
    stock: usize,
}

impl HeaderSchema {
    /// Resolve column positions from a header row.
    ///
    /// Returns `None` when any required column is missing.
    pub fn parse<'a, I>(columns: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut vendor_id = None;
        let mut name = None;
        let mut description = None;
        let mut price = None;
        let mut stock = None;

        for (idx, column) in columns.into_iter().enumerate() {
            match column {
                "vendor_id" => vendor_id = Some(idx),
                "name" => name = Some(idx),
                "description" => description = Some(idx),
                "price" => price = Some(idx),
                "stock" => stock = Some(idx),
                _ => {}
            }
        }

        Some(Self {
            vendor_id: vendor_id?,
            name: name?,
            description: description?,
            price: price?,
            stock: stock?,
        })
    }

    /// Pair one data row with this schema, producing an [`ImportRecord`].
    ///
    /// Cells beyond the end of a short row are treated as absent, which
    /// the validator then reports as missing fields.
    pub fn build_record(&self, row: &[&str]) -> ImportRecord {
        let cell = |idx: usize| row.get(idx).map(|s| s.to_string());
        ImportRecord {
            vendor_id: cell(self.vendor_id),
            name: cell(self.name),
            description: cell(self.description),
            price: cell(self.price),
            stock: cell(self.stock),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One raw CSV data row, keyed by the header schema. Ephemeral: exists
/// only between row parsing and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub vendor_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
}

/// A row that passed every field and referential check and is ready for
/// persistence. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedProduct {
    pub id: EntityId,
    pub vendor_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Why a row was rejected. Carries the failing field names and the
/// original record so the caller can log the skipped payload.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub fields: Vec<&'static str>,
    pub record: ImportRecord,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid fields: {}", self.fields.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate one raw record against the product field rules and the
/// injected vendor-existence capability.
///
/// All rules are checked so the failure reports the complete failing
/// field set. On success a fresh identifier and current timestamps are
/// assigned. A bad row never panics; it is the caller's job to log the
/// failure and move on.
pub fn validate_record<F>(
    record: &ImportRecord,
    vendor_exists: F,
) -> Result<ValidatedProduct, ValidationFailure>
where
    F: Fn(EntityId) -> bool,
{
    let mut fields: Vec<&'static str> = Vec::new();

    let vendor_id = match record.vendor_id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) if vendor_exists(id) => Some(id),
        _ => {
            fields.push("vendor_id");
            None
        }
    };

    let name = match record.name.as_deref() {
        Some(n) if !n.is_empty() && n.chars().count() <= MAX_NAME_LENGTH => Some(n.to_string()),
        _ => {
            fields.push("name");
            None
        }
    };

    let price = match record.price.as_deref().map(str::parse::<f64>) {
        Some(Ok(p)) if p.is_finite() && p >= 0.0 => Some(p),
        _ => {
            fields.push("price");
            None
        }
    };

    let stock = match record.stock.as_deref().map(str::parse::<i32>) {
        Some(Ok(s)) if s >= 0 => Some(s),
        _ => {
            fields.push("stock");
            None
        }
    };

    // A field is None exactly when its name was pushed onto `fields`.
    let (Some(vendor_id), Some(name), Some(price), Some(stock)) = (vendor_id, name, price, stock)
    else {
        return Err(ValidationFailure {
            fields,
            record: record.clone(),
        });
    };

    let now = chrono::Utc::now();
    Ok(ValidatedProduct {
        id: Uuid::new_v4(),
        vendor_id,
        name,
        description: record.description.clone(),
        price,
        stock,
        created_at: now,
        updated_at: now,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- HeaderSchema tests ---------------------------------------------------

    #[test]
    fn header_in_canonical_order() {
        let schema =
            HeaderSchema::parse(["vendor_id", "name", "description", "price", "stock"]).unwrap();
        let record = schema.build_record(&["v", "n", "d", "p", "s"]);
        assert_eq!(record.vendor_id.as_deref(), Some("v"));
        assert_eq!(record.stock.as_deref(), Some("s"));
    }

    #[test]
    fn header_order_insensitive() {
        let schema =
            HeaderSchema::parse(["stock", "price", "description", "name", "vendor_id"]).unwrap();
        let record = schema.build_record(&["5", "9.99", "desc", "Widget", "abc"]);
        assert_eq!(record.vendor_id.as_deref(), Some("abc"));
        assert_eq!(record.name.as_deref(), Some("Widget"));
        assert_eq!(record.price.as_deref(), Some("9.99"));
        assert_eq!(record.stock.as_deref(), Some("5"));
    }

    #[test]
    fn header_tolerates_extra_columns() {
        let schema = HeaderSchema::parse([
            "sku",
            "vendor_id",
            "name",
            "description",
            "price",
            "stock",
            "notes",
        ])
        .unwrap();
        let record = schema.build_record(&["X1", "v", "n", "d", "1.0", "2", "ignored"]);
        assert_eq!(record.vendor_id.as_deref(), Some("v"));
        assert_eq!(record.stock.as_deref(), Some("2"));
    }

    #[test]
    fn header_missing_required_column_rejected() {
        assert!(HeaderSchema::parse(["vendor_id", "name", "description", "price"]).is_none());
        assert!(HeaderSchema::parse(std::iter::empty()).is_none());
    }

    #[test]
    fn duplicate_column_resolves_to_last_occurrence() {
        let schema =
            HeaderSchema::parse(["name", "vendor_id", "name", "description", "price", "stock"])
                .unwrap();
        let record = schema.build_record(&["first", "v", "second", "d", "1", "2"]);
        assert_eq!(record.name.as_deref(), Some("second"));
    }

    #[test]
    fn short_row_leaves_trailing_fields_absent() {
        let schema =
            HeaderSchema::parse(["vendor_id", "name", "description", "price", "stock"]).unwrap();
        let record = schema.build_record(&["v", "n"]);
        assert_eq!(record.name.as_deref(), Some("n"));
        assert!(record.description.is_none());
        assert!(record.price.is_none());
        assert!(record.stock.is_none());
    }

    // -- validate_record tests ------------------------------------------------

    fn known_vendor() -> EntityId {
        Uuid::parse_str("6f1c9e9a-4f7b-4e1a-9c2d-8a5b3c7d1e2f").unwrap()
    }

    fn valid_record() -> ImportRecord {
        ImportRecord {
            vendor_id: Some(known_vendor().to_string()),
            name: Some("Widget".to_string()),
            description: Some("A widget".to_string()),
            price: Some("19.99".to_string()),
            stock: Some("42".to_string()),
        }
    }

    fn exists(id: EntityId) -> bool {
        id == known_vendor()
    }

    #[test]
    fn valid_record_passes() {
        let product = validate_record(&valid_record(), exists).unwrap();
        assert_eq!(product.vendor_id, known_vendor());
        assert_eq!(product.name, "Widget");
        assert_eq!(product.description.as_deref(), Some("A widget"));
        assert_eq!(product.price, 19.99);
        assert_eq!(product.stock, 42);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn each_validation_generates_fresh_id() {
        let a = validate_record(&valid_record(), exists).unwrap();
        let b = validate_record(&valid_record(), exists).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn description_is_optional() {
        let mut record = valid_record();
        record.description = None;
        let product = validate_record(&record, exists).unwrap();
        assert!(product.description.is_none());
    }

    #[test]
    fn missing_vendor_id_rejected() {
        let mut record = valid_record();
        record.vendor_id = None;
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["vendor_id"]);
    }

    #[test]
    fn malformed_vendor_id_rejected() {
        let mut record = valid_record();
        record.vendor_id = Some("not-a-uuid".to_string());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["vendor_id"]);
    }

    #[test]
    fn unknown_vendor_rejected() {
        let mut record = valid_record();
        record.vendor_id = Some(Uuid::new_v4().to_string());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["vendor_id"]);
    }

    #[test]
    fn empty_name_rejected() {
        let mut record = valid_record();
        record.name = Some(String::new());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["name"]);
    }

    #[test]
    fn overlong_name_rejected() {
        let mut record = valid_record();
        record.name = Some("x".repeat(MAX_NAME_LENGTH + 1));
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["name"]);
    }

    #[test]
    fn name_at_max_length_accepted() {
        let mut record = valid_record();
        record.name = Some("x".repeat(MAX_NAME_LENGTH));
        assert!(validate_record(&record, exists).is_ok());
    }

    #[test]
    fn negative_price_rejected() {
        let mut record = valid_record();
        record.price = Some("-0.01".to_string());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["price"]);
    }

    #[test]
    fn non_numeric_price_rejected() {
        let mut record = valid_record();
        record.price = Some("free".to_string());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["price"]);
    }

    #[test]
    fn zero_price_accepted() {
        let mut record = valid_record();
        record.price = Some("0".to_string());
        assert!(validate_record(&record, exists).is_ok());
    }

    #[test]
    fn negative_stock_rejected() {
        let mut record = valid_record();
        record.stock = Some("-1".to_string());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["stock"]);
    }

    #[test]
    fn fractional_stock_rejected() {
        let mut record = valid_record();
        record.stock = Some("3.5".to_string());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["stock"]);
    }

    #[test]
    fn all_failing_fields_reported() {
        let record = ImportRecord::default();
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.fields, vec!["vendor_id", "name", "price", "stock"]);
    }

    #[test]
    fn failure_carries_original_record() {
        let mut record = valid_record();
        record.price = Some("oops".to_string());
        let failure = validate_record(&record, exists).unwrap_err();
        assert_eq!(failure.record, record);
        assert_eq!(failure.to_string(), "invalid fields: price");
    }

    #[test]
    fn batch_size_is_500() {
        assert_eq!(IMPORT_BATCH_SIZE, 500);
    }
}
