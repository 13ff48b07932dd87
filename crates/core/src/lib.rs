//! `rentaldesk-core` — domain foundation for the rental tool server.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! typed identifiers over the rental schema, the record shapes tools return,
//! and the failure taxonomy every layer reports in.

pub mod error;
pub mod id;
pub mod record;

pub use error::{ToolError, ToolResult};
pub use id::{CustomerId, FilmId, InventoryId, RentalId, StaffId};
pub use record::{
    AvailableUnit, ColumnInfo, CustomerRecord, FilmRecord, HistoryEntry, RentalReceipt,
    ReturnReceipt, RevenueRow,
};
