//! Catalog read tools: film search, customer search, availability lookup.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use rentaldesk_core::{FilmId, ToolResult};
use rentaldesk_store::{FilmFilter, RentalStore};

use crate::tool::{bounded_limit, encode_result, parse_args, Tool};

/// `search_movies` — title/description, genre, and release-year search.
pub struct SearchMoviesTool {
    store: Arc<dyn RentalStore>,
}

impl SearchMoviesTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct SearchMoviesArgs {
    search_term: Option<String>,
    genre: Option<String>,
    year: Option<i32>,
    limit: Option<i64>,
}

#[async_trait]
impl Tool for SearchMoviesTool {
    fn name(&self) -> &'static str {
        "search_movies"
    }

    fn description(&self) -> &'static str {
        "Search for movies by title/description, genre, or release year."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search_term": {
                    "type": "string",
                    "description": "Case-insensitive substring over title and description"
                },
                "genre": {
                    "type": "string",
                    "description": "Case-insensitive substring over the category name"
                },
                "year": {"type": "integer", "description": "Exact release year"},
                "limit": {"type": "integer", "description": "Max rows (default 20)"}
            }
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: SearchMoviesArgs = parse_args(arguments)?;
        let filter = FilmFilter {
            search_term: args.search_term,
            genre: args.genre,
            year: args.year,
            limit: bounded_limit(args.limit, 20)?,
        };

        let films = self.store.search_films(&filter).await?;
        encode_result(&films)
    }
}

/// `search_customers` — name/email directory search.
pub struct SearchCustomersTool {
    store: Arc<dyn RentalStore>,
}

impl SearchCustomersTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct SearchCustomersArgs {
    search_term: String,
    limit: Option<i64>,
}

#[async_trait]
impl Tool for SearchCustomersTool {
    fn name(&self) -> &'static str {
        "search_customers"
    }

    fn description(&self) -> &'static str {
        "Search for customers by name or email (case-insensitive substring)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search_term": {"type": "string"},
                "limit": {"type": "integer", "description": "Max rows (default 20)"}
            },
            "required": ["search_term"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: SearchCustomersArgs = parse_args(arguments)?;
        let limit = bounded_limit(args.limit, 20)?;

        let customers = self.store.search_customers(&args.search_term, limit).await?;
        encode_result(&customers)
    }
}

/// `get_available_inventory` — copies of a film with no open rental.
pub struct GetAvailableInventoryTool {
    store: Arc<dyn RentalStore>,
}

impl GetAvailableInventoryTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct GetAvailableInventoryArgs {
    film_id: i32,
}

#[async_trait]
impl Tool for GetAvailableInventoryTool {
    fn name(&self) -> &'static str {
        "get_available_inventory"
    }

    fn description(&self) -> &'static str {
        "Get available inventory for a film (copies not currently rented out)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "film_id": {"type": "integer"}
            },
            "required": ["film_id"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: GetAvailableInventoryArgs = parse_args(arguments)?;

        let units = self
            .store
            .available_inventory(FilmId::new(args.film_id))
            .await?;
        encode_result(&units)
    }
}
