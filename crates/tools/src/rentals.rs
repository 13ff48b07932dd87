//! Rental tools: history, rent, return.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use rentaldesk_core::{CustomerId, InventoryId, RentalId, StaffId, ToolResult};
use rentaldesk_store::RentalStore;

use crate::tool::{bounded_limit, encode_result, parse_args, Tool};

/// `get_customer_history` — past and open rentals for a customer.
pub struct GetCustomerHistoryTool {
    store: Arc<dyn RentalStore>,
}

impl GetCustomerHistoryTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct GetCustomerHistoryArgs {
    customer_id: i32,
    limit: Option<i64>,
}

#[async_trait]
impl Tool for GetCustomerHistoryTool {
    fn name(&self) -> &'static str {
        "get_customer_history"
    }

    fn description(&self) -> &'static str {
        "Get rental history for a customer, newest first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_id": {"type": "integer"},
                "limit": {"type": "integer", "description": "Max rows (default 20)"}
            },
            "required": ["customer_id"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: GetCustomerHistoryArgs = parse_args(arguments)?;
        let limit = bounded_limit(args.limit, 20)?;

        let history = self
            .store
            .customer_history(CustomerId::new(args.customer_id), limit)
            .await?;
        encode_result(&history)
    }
}

/// `rent_movie` — the rent half of the inventory state transition.
pub struct RentMovieTool {
    store: Arc<dyn RentalStore>,
    default_staff: StaffId,
}

impl RentMovieTool {
    pub fn new(store: Arc<dyn RentalStore>, default_staff: StaffId) -> Self {
        Self {
            store,
            default_staff,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RentMovieArgs {
    customer_id: i32,
    inventory_id: i32,
    staff_id: Option<i32>,
}

#[async_trait]
impl Tool for RentMovieTool {
    fn name(&self) -> &'static str {
        "rent_movie"
    }

    fn description(&self) -> &'static str {
        "Rent a movie (create a new rental). Fails if the copy is already rented out."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_id": {"type": "integer"},
                "inventory_id": {"type": "integer"},
                "staff_id": {
                    "type": "integer",
                    "description": "Staff recording the rental; configured default when omitted"
                }
            },
            "required": ["customer_id", "inventory_id"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: RentMovieArgs = parse_args(arguments)?;
        let staff_id = args.staff_id.map(StaffId::new).unwrap_or(self.default_staff);

        let receipt = self
            .store
            .attempt_rent(
                CustomerId::new(args.customer_id),
                InventoryId::new(args.inventory_id),
                staff_id,
            )
            .await?;
        encode_result(&receipt)
    }
}

/// `return_movie` — the return half of the inventory state transition.
pub struct ReturnMovieTool {
    store: Arc<dyn RentalStore>,
}

impl ReturnMovieTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct ReturnMovieArgs {
    rental_id: i32,
}

#[async_trait]
impl Tool for ReturnMovieTool {
    fn name(&self) -> &'static str {
        "return_movie"
    }

    fn description(&self) -> &'static str {
        "Return a rented movie (set the return date). Fails if already returned."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "rental_id": {"type": "integer"}
            },
            "required": ["rental_id"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: ReturnMovieArgs = parse_args(arguments)?;

        let receipt = self
            .store
            .attempt_return(RentalId::new(args.rental_id))
            .await?;
        encode_result(&receipt)
    }
}
