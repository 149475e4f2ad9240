use rmcp::ErrorData as McpError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request timeout after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("Unable to connect to PolyNeural.ai API at {url}")]
    Unreachable { url: String },

    #[error("HTTP {status}: {reason} - {body}")]
    UpstreamHttp {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Short machine-readable name, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::Config(_) => "config",
            BridgeError::Timeout { .. } => "timeout",
            BridgeError::Unreachable { .. } => "unreachable",
            BridgeError::UpstreamHttp { .. } => "upstream_http",
            BridgeError::MalformedResponse(_) => "malformed_response",
            BridgeError::Transport(_) => "transport",
            BridgeError::Cancelled => "cancelled",
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::MalformedResponse(err.to_string())
    }
}

impl From<config::ConfigError> for BridgeError {
    fn from(err: config::ConfigError) -> Self {
        BridgeError::Config(err.to_string())
    }
}

// Only the normalized message reaches the client; details stay in the logs.
impl From<BridgeError> for McpError {
    fn from(err: BridgeError) -> Self {
        McpError::internal_error(err.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(BridgeError::Config("test".to_string()).kind(), "config");
        assert_eq!(
            BridgeError::Timeout {
                timeout: Duration::from_secs(1)
            }
            .kind(),
            "timeout"
        );
        assert_eq!(
            BridgeError::Unreachable {
                url: "http://localhost".to_string()
            }
            .kind(),
            "unreachable"
        );
        assert_eq!(
            BridgeError::UpstreamHttp {
                status: 502,
                reason: "Bad Gateway".to_string(),
                body: String::new(),
            }
            .kind(),
            "upstream_http"
        );
        assert_eq!(
            BridgeError::MalformedResponse("test".to_string()).kind(),
            "malformed_response"
        );
        assert_eq!(BridgeError::Transport("test".to_string()).kind(), "transport");
        assert_eq!(BridgeError::Cancelled.kind(), "cancelled");
    }

    #[test]
    fn test_timeout_display_uses_milliseconds() {
        let err = BridgeError::Timeout {
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Request timeout after 10000ms");
    }

    #[test]
    fn test_upstream_http_display() {
        let err = BridgeError::UpstreamHttp {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: "server error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 500: Internal Server Error - server error"
        );
    }

    #[test]
    fn test_unreachable_names_url() {
        let err = BridgeError::Unreachable {
            url: "http://127.0.0.1:9".to_string(),
        };
        assert!(err.to_string().contains("http://127.0.0.1:9"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: BridgeError = json_err.into();
        assert!(matches!(err, BridgeError::MalformedResponse(_)));
    }

    #[test]
    fn test_error_into_mcp_error() {
        let err = BridgeError::Timeout {
            timeout: Duration::from_millis(250),
        };
        let mcp_err: McpError = err.into();

        assert_eq!(mcp_err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
        assert_eq!(mcp_err.message, "Request timeout after 250ms");
        assert!(mcp_err.data.is_none());
    }
}
