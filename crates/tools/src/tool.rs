//! Tool trait and descriptor types.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use rentaldesk_core::{ToolError, ToolResult};

/// One callable, named operation.
///
/// `call` receives the raw JSON arguments object and returns the result as a
/// JSON value; argument decoding failures surface as `invalid_params`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema for the arguments object.
    fn input_schema(&self) -> Value;

    async fn call(&self, arguments: Value) -> ToolResult<Value>;
}

/// Listing entry for a registered tool (what `tools/list` returns).
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Decode a tool's arguments object into its typed input struct.
pub fn parse_args<T: DeserializeOwned>(arguments: Value) -> ToolResult<T> {
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_params(e.to_string()))
}

/// Encode a tool result as JSON.
pub fn encode_result<T: Serialize>(value: &T) -> ToolResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ToolError::store_unavailable(format!("failed to encode result: {e}")))
}

/// Validate an optional row cap against the hard ceiling.
pub fn bounded_limit(limit: Option<i64>, default: i64) -> ToolResult<i64> {
    let limit = limit.unwrap_or(default);
    if !(1..=500).contains(&limit) {
        return Err(ToolError::invalid_params(format!(
            "limit must be between 1 and 500, got {limit}"
        )));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        customer_id: i32,
    }

    #[test]
    fn parse_args_reports_invalid_params() {
        let ok: Sample = parse_args(json!({"customer_id": 35})).unwrap();
        assert_eq!(ok.customer_id, 35);

        let err = parse_args::<Sample>(json!({"customer_id": "x"})).unwrap_err();
        assert_eq!(err.code(), "invalid_params");
    }

    #[test]
    fn bounded_limit_applies_default_and_ceiling() {
        assert_eq!(bounded_limit(None, 20).unwrap(), 20);
        assert_eq!(bounded_limit(Some(500), 20).unwrap(), 500);
        assert_eq!(bounded_limit(Some(0), 20).unwrap_err().code(), "invalid_params");
        assert_eq!(bounded_limit(Some(501), 20).unwrap_err().code(), "invalid_params");
    }
}
