//! Store abstraction consumed by the tool surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use rentaldesk_core::{
    AvailableUnit, ColumnInfo, CustomerId, CustomerRecord, FilmId, FilmRecord, HistoryEntry,
    InventoryId, RentalId, RentalReceipt, ReturnReceipt, RevenueRow, StaffId, ToolResult,
};

/// Catalog search filter. All criteria are optional and conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilmFilter {
    /// Case-insensitive substring over title and description.
    pub search_term: Option<String>,
    /// Case-insensitive substring over the category name.
    pub genre: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
    /// Maximum number of rows returned.
    pub limit: i64,
}

/// Grouping axis for the revenue report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevenueGrouping {
    Category,
    Store,
}

impl Default for RevenueGrouping {
    fn default() -> Self {
        Self::Category
    }
}

/// Operations the tool surface needs from the relational store.
///
/// Read operations recompute availability from current rental state at call
/// time; nothing is cached in process memory. The two mutating operations
/// (`attempt_rent`, `attempt_return`) run their read-check-write sequence
/// inside one atomic unit, serialized per inventory unit resp. per rental,
/// so that racing calls on the same row yield exactly one winner.
#[async_trait]
pub trait RentalStore: Send + Sync {
    /// Search films by title/description, category, and release year.
    async fn search_films(&self, filter: &FilmFilter) -> ToolResult<Vec<FilmRecord>>;

    /// Search customers by name or email (case-insensitive substring).
    async fn search_customers(&self, term: &str, limit: i64) -> ToolResult<Vec<CustomerRecord>>;

    /// Rental history for a customer, newest first.
    ///
    /// Fails `NotFound` if the customer id does not exist.
    async fn customer_history(
        &self,
        customer_id: CustomerId,
        limit: i64,
    ) -> ToolResult<Vec<HistoryEntry>>;

    /// Copies of a film with no open rental.
    ///
    /// Fails `NotFound` if the film id does not exist; a known film with
    /// every copy rented out yields an empty list.
    async fn available_inventory(&self, film_id: FilmId) -> ToolResult<Vec<AvailableUnit>>;

    /// Rent one inventory unit: fails `AlreadyRented` if the unit has an
    /// open rental, `NotFound` if any referenced id is missing.
    async fn attempt_rent(
        &self,
        customer_id: CustomerId,
        inventory_id: InventoryId,
        staff_id: StaffId,
    ) -> ToolResult<RentalReceipt>;

    /// Close an open rental: fails `AlreadyReturned` if the rental is
    /// already closed, `NotFound` if the id is unknown. A failed return
    /// never alters the stored return timestamp.
    async fn attempt_return(&self, rental_id: RentalId) -> ToolResult<ReturnReceipt>;

    /// Aggregate payment revenue, descending.
    async fn revenue(&self, grouping: RevenueGrouping) -> ToolResult<Vec<RevenueRow>>;

    /// Execute an already-guarded read-only statement, capped at `limit`
    /// rows, each row a JSON object keyed by column name.
    async fn run_select(&self, query: &str, limit: i64) -> ToolResult<Vec<serde_json::Value>>;

    /// Table names in a schema, sorted.
    async fn list_tables(&self, schema: &str) -> ToolResult<Vec<String>>;

    /// Column descriptions for a table, in ordinal order. Unknown tables
    /// yield an empty list, mirroring an information-schema read.
    async fn describe_table(&self, table: &str, schema: &str) -> ToolResult<Vec<ColumnInfo>>;
}
