//! Tool failure taxonomy.

use thiserror::Error;

use crate::id::{InventoryId, RentalId};

/// Result type used across the tool and store layers.
pub type ToolResult<T> = Result<T, ToolError>;

/// Failure reported to the calling agent.
///
/// Keep this focused on deterministic, caller-visible failures. None of
/// these are retried internally: `StoreUnavailable` is the only class where
/// retrying the same call unchanged can help; the state-transition failures
/// require the caller to re-resolve current state first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// A referenced entity id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// The inventory unit already has an open rental.
    #[error("inventory unit {inventory_id} is already rented out")]
    AlreadyRented { inventory_id: InventoryId },

    /// The rental row is already closed.
    #[error("rental {rental_id} was already returned")]
    AlreadyReturned { rental_id: RentalId },

    /// A non-read statement was submitted to the read-only query tool.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Tool arguments failed to decode or validate.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The relational store could not be reached or failed mid-call.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ToolError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn already_rented(inventory_id: InventoryId) -> Self {
        Self::AlreadyRented { inventory_id }
    }

    pub fn already_returned(rental_id: RentalId) -> Self {
        Self::AlreadyReturned { rental_id }
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Stable machine-readable code used in structured failure payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyRented { .. } => "already_rented",
            Self::AlreadyReturned { .. } => "already_returned",
            Self::InvalidQuery(_) => "invalid_query",
            Self::InvalidParams(_) => "invalid_params",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Whether retrying the identical call can succeed without the caller
    /// first re-reading state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
