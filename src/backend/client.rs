use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::mcp::types::{unwrap_result, JsonRpcRequest, McpMethod};
use reqwest::header::{HeaderName, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Header advertising the client-side deadline to the backend, in milliseconds
pub const REQUEST_TIMEOUT_HEADER: HeaderName = HeaderName::from_static("x-request-timeout");

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const UNREADABLE_BODY: &str = "Unknown error";
const BODY_EXCERPT_CHARS: usize = 512;

/// HTTP client for the PolyNeural.ai MCP endpoints
#[derive(Clone)]
pub struct BackendClient {
    config: Arc<BridgeConfig>,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Forward one protocol method and return the backend's `result` member.
    pub async fn forward(
        &self,
        method: McpMethod,
        id: Option<Value>,
        params: Value,
        ct: &CancellationToken,
    ) -> Result<Value> {
        let envelope = JsonRpcRequest::new(method, id, params);
        let response = self
            .call(method.endpoint(), Method::POST, Some(&envelope), ct)
            .await?;
        Ok(unwrap_result(response))
    }

    /// Issue a single request against `<api_url>/mcp<endpoint>`.
    ///
    /// The configured timeout bounds the wait for response headers. The token
    /// aborts the whole call, body included.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<&JsonRpcRequest>,
        ct: &CancellationToken,
    ) -> Result<Value> {
        let result = tokio::select! {
            _ = ct.cancelled() => Err(BridgeError::Cancelled),
            result = self.execute(endpoint, method, payload) => result,
        };

        if let Err(e) = &result {
            if self.config.debug {
                debug!(kind = e.kind(), error = %e, "HTTP request error");
            }
        }
        result
    }

    async fn execute(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<&JsonRpcRequest>,
    ) -> Result<Value> {
        let url = format!("{}/mcp{}", self.config.api_url, endpoint);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_TIMEOUT_HEADER, self.config.timeout_ms().to_string());

        if let Some(payload) = payload {
            request = request.json(payload);
        }

        if self.config.debug {
            debug!("HTTP {} {}", method, url);
            if let Some(payload) = payload {
                debug!(
                    "Request body: {}",
                    serde_json::to_string_pretty(payload).unwrap_or_default()
                );
            }
        }

        // Dropping the send future on expiry aborts the in-flight request.
        let response = match tokio::time::timeout(self.config.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(self.classify_error(e)),
            Err(_) => {
                warn!(
                    url = %url,
                    timeout_ms = self.config.timeout_ms() as u64,
                    "Backend request timed out"
                );
                return Err(BridgeError::Timeout {
                    timeout: self.config.timeout,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            warn!(status = status.as_u16(), url = %url, "Backend returned error status");
            return Err(BridgeError::UpstreamHttp {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_error(e))?;
        let parsed: Value = serde_json::from_slice(&bytes)?;

        if self.config.debug {
            debug!(
                "Response: {}",
                serde_json::to_string_pretty(&parsed).unwrap_or_default()
            );
        }

        Ok(parsed)
    }

    fn classify_error(&self, error: reqwest::Error) -> BridgeError {
        if error.is_connect() {
            warn!(url = %self.config.api_url, error = %error, "Failed to connect to backend");
            BridgeError::Unreachable {
                url: self.config.api_url.clone(),
            }
        } else if error.is_timeout() {
            BridgeError::Timeout {
                timeout: self.config.timeout,
            }
        } else {
            BridgeError::Transport(error.to_string())
        }
    }
}

async fn read_error_body(response: Response) -> String {
    match response.text().await {
        Ok(text) => excerpt(&text),
        Err(_) => UNREADABLE_BODY.to_string(),
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
