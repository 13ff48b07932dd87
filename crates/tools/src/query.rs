//! Schema introspection and the guarded free-form query tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use rentaldesk_core::ToolResult;
use rentaldesk_store::RentalStore;

use crate::tool::{bounded_limit, encode_result, parse_args, Tool};

/// `run_select_query` — free-form read-only query, guarded before execution.
pub struct RunSelectQueryTool {
    store: Arc<dyn RentalStore>,
}

impl RunSelectQueryTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct RunSelectQueryArgs {
    query: String,
    limit: Option<i64>,
}

#[async_trait]
impl Tool for RunSelectQueryTool {
    fn name(&self) -> &'static str {
        "run_select_query"
    }

    fn description(&self) -> &'static str {
        "Run a read-only SELECT query. Any other statement is rejected."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "A single SELECT statement"},
                "limit": {"type": "integer", "description": "Row cap (default 50)"}
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: RunSelectQueryArgs = parse_args(arguments)?;
        let limit = bounded_limit(args.limit, 50)?;

        let rows = self.store.run_select(&args.query, limit).await?;
        Ok(Value::Array(rows))
    }
}

/// `list_tables` — table names in a schema.
pub struct ListTablesTool {
    store: Arc<dyn RentalStore>,
}

impl ListTablesTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct ListTablesArgs {
    schema: Option<String>,
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &'static str {
        "list_tables"
    }

    fn description(&self) -> &'static str {
        "List tables in a schema (default public)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "schema": {"type": "string", "description": "Schema name (default public)"}
            }
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: ListTablesArgs = parse_args(arguments)?;
        let schema = args.schema.as_deref().unwrap_or("public");

        let tables = self.store.list_tables(schema).await?;
        encode_result(&tables)
    }
}

/// `describe_table` — column descriptions for one table.
pub struct DescribeTableTool {
    store: Arc<dyn RentalStore>,
}

impl DescribeTableTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct DescribeTableArgs {
    table_name: String,
    schema: Option<String>,
}

#[async_trait]
impl Tool for DescribeTableTool {
    fn name(&self) -> &'static str {
        "describe_table"
    }

    fn description(&self) -> &'static str {
        "Describe the columns of a table."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "table_name": {"type": "string"},
                "schema": {"type": "string", "description": "Schema name (default public)"}
            },
            "required": ["table_name"]
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: DescribeTableArgs = parse_args(arguments)?;
        let schema = args.schema.as_deref().unwrap_or("public");

        let columns = self.store.describe_table(&args.table_name, schema).await?;
        encode_result(&columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentaldesk_store::InMemoryStore;

    #[tokio::test]
    async fn run_select_query_rejects_writes_before_the_store() {
        let tool = RunSelectQueryTool::new(Arc::new(InMemoryStore::new()));

        let err = tool
            .call(json!({"query": "DELETE FROM rental"}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_query");

        let ok = tool.call(json!({"query": "SELECT 1"})).await.unwrap();
        assert_eq!(ok, json!([]));
    }

    #[tokio::test]
    async fn describe_table_defaults_to_public_schema() {
        let store = Arc::new(InMemoryStore::new());
        let tool = DescribeTableTool::new(store);

        let columns = tool.call(json!({"table_name": "rental"})).await.unwrap();
        let names: Vec<&str> = columns
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["column_name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"return_date"));
    }
}
