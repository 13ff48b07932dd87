//! Tool name → handler registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use rentaldesk_core::{ToolError, ToolResult};

use crate::tool::{Tool, ToolDescriptor};

/// Fixed set of named tools, consulted by the protocol dispatch.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Descriptors for every registered tool, sorted by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|t| ToolDescriptor {
                name: t.name(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Dispatch one call. Unknown names are a parameter error, not a panic.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::invalid_params(format!("unknown tool '{name}'")))?;

        tracing::debug!(tool = name, "dispatching tool call");
        tool.call(arguments).await
    }
}
