//! Record shapes returned by the tool surface.
//!
//! These are plain serializable rows; every field name matches the JSON the
//! calling agent sees.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::id::{CustomerId, FilmId, InventoryId, RentalId, StaffId};

/// One film hit from a catalog search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub film_id: FilmId,
    pub title: String,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub rental_rate: Option<Decimal>,
    pub rating: Option<String>,
    pub description: Option<String>,
}

/// One customer hit from a directory search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub active: bool,
}

/// One past (or still open) rental in a customer's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub rental_id: RentalId,
    pub rental_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub title: String,
    pub amount: Option<Decimal>,
}

/// A rentable copy with no open rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableUnit {
    pub inventory_id: InventoryId,
    pub store_id: i32,
}

/// Outcome of a successful rent operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalReceipt {
    pub rental_id: RentalId,
    pub customer_id: CustomerId,
    pub inventory_id: InventoryId,
    pub staff_id: StaffId,
    pub rental_date: DateTime<Utc>,
}

/// Outcome of a successful return operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnReceipt {
    pub rental_id: RentalId,
    pub return_date: DateTime<Utc>,
}

/// One aggregate revenue row (grouped by category or by store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRow {
    pub group: String,
    pub revenue: Decimal,
}

/// One column of a described table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_serializes_with_schema_field_names() {
        let receipt = RentalReceipt {
            rental_id: RentalId::new(16050),
            customer_id: CustomerId::new(35),
            inventory_id: InventoryId::new(402),
            staff_id: StaffId::new(1),
            rental_date: Utc::now(),
        };

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["rental_id"], 16050);
        assert_eq!(json["customer_id"], 35);
        assert_eq!(json["inventory_id"], 402);
        assert_eq!(json["staff_id"], 1);
        assert!(json["rental_date"].is_string());
    }

    #[test]
    fn open_history_entry_has_null_return_date() {
        let entry = HistoryEntry {
            rental_id: RentalId::new(1),
            rental_date: Utc::now(),
            return_date: None,
            title: "ACADEMY DINOSAUR".to_string(),
            amount: Some(Decimal::new(499, 2)),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["return_date"].is_null());
        assert_eq!(json["title"], "ACADEMY DINOSAUR");
    }
}
