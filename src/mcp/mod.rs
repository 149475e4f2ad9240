pub mod bridge;
pub mod types;

pub use bridge::HttpBridge;
pub use types::{JsonRpcRequest, McpMethod};
