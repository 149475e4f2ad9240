use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol methods the bridge forwards to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpMethod {
    Initialize,
    ToolsList,
    ToolsCall,
}

impl McpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            McpMethod::Initialize => "initialize",
            McpMethod::ToolsList => "tools/list",
            McpMethod::ToolsCall => "tools/call",
        }
    }

    /// Path appended to `<api_url>/mcp`
    pub fn endpoint(&self) -> &'static str {
        match self {
            McpMethod::Initialize => "/initialize",
            McpMethod::ToolsList => "/tools/list",
            McpMethod::ToolsCall => "/tools/call",
        }
    }
}

impl fmt::Display for McpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON-RPC 2.0 request envelope sent to the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    /// Build an envelope; the id falls back to `1` when the caller has none
    pub fn new(method: McpMethod, id: Option<Value>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.unwrap_or_else(|| Value::from(1)),
            method: method.as_str().to_string(),
            params,
        }
    }
}

/// Take the `result` member out of a backend response.
///
/// An `error` member is not inspected. A body without `result` (including
/// non-object bodies) yields `null`.
pub fn unwrap_result(response: Value) -> Value {
    match response {
        Value::Object(mut map) => map.remove("result").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
