pub mod backend;
pub mod config;
pub mod error;
pub mod mcp;
pub mod serve;
pub mod supervisor;

pub use error::{BridgeError, Result};
