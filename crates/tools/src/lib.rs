//! `rentaldesk-tools` — the tool surface exposed to the calling agent.
//!
//! Each tool wraps one store operation in a named, JSON-schema-described
//! handler. The [`ToolRegistry`] maps tool names to handlers and is the
//! only thing the protocol layer needs to hold.

use std::sync::Arc;

use rentaldesk_core::StaffId;
use rentaldesk_store::RentalStore;

pub mod catalog;
pub mod query;
pub mod registry;
pub mod rentals;
pub mod revenue;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDescriptor};

/// Build the registry with every exposed tool registered.
pub fn create_registry(store: Arc<dyn RentalStore>, default_staff: StaffId) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(catalog::SearchMoviesTool::new(Arc::clone(&store)));
    registry.register(catalog::SearchCustomersTool::new(Arc::clone(&store)));
    registry.register(catalog::GetAvailableInventoryTool::new(Arc::clone(&store)));

    registry.register(rentals::GetCustomerHistoryTool::new(Arc::clone(&store)));
    registry.register(rentals::RentMovieTool::new(Arc::clone(&store), default_staff));
    registry.register(rentals::ReturnMovieTool::new(Arc::clone(&store)));

    registry.register(revenue::AnalyzeRevenueTool::new(Arc::clone(&store)));

    registry.register(query::RunSelectQueryTool::new(Arc::clone(&store)));
    registry.register(query::ListTablesTool::new(Arc::clone(&store)));
    registry.register(query::DescribeTableTool::new(store));

    registry
}
