//! Revenue reporting tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use rentaldesk_core::ToolResult;
use rentaldesk_store::{RentalStore, RevenueGrouping};

use crate::tool::{encode_result, parse_args, Tool};

/// `analyze_revenue` — aggregate payment revenue by category or by store.
pub struct AnalyzeRevenueTool {
    store: Arc<dyn RentalStore>,
}

impl AnalyzeRevenueTool {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeRevenueArgs {
    by: Option<RevenueGrouping>,
}

#[async_trait]
impl Tool for AnalyzeRevenueTool {
    fn name(&self) -> &'static str {
        "analyze_revenue"
    }

    fn description(&self) -> &'static str {
        "Analyze revenue grouped by category (default) or by store."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "by": {
                    "type": "string",
                    "enum": ["category", "store"],
                    "description": "Grouping axis (default category)"
                }
            }
        })
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let args: AnalyzeRevenueArgs = parse_args(arguments)?;
        let grouping = args.by.unwrap_or_default();

        let rows = self.store.revenue(grouping).await?;
        encode_result(&rows)
    }
}
