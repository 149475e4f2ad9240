// MCP server that answers stdio requests by forwarding them to the HTTP backend.
// No business logic lives here: every method is an envelope round trip.

use rmcp::model::{
    ClientNotification, ClientRequest, CustomResult, ErrorCode, InitializeResult,
    ServerCapabilities, ServerInfo, ServerResult,
};
use rmcp::service::{NotificationContext, RequestContext};
use rmcp::{ErrorData as McpError, RoleServer, Service};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::types::McpMethod;
use crate::backend::BackendClient;
use crate::error::{BridgeError, Result};
use crate::supervisor::Supervisor;

/// Host-facing side of the bridge, registered with the rmcp service
#[derive(Clone)]
pub struct HttpBridge {
    backend: BackendClient,
    supervisor: Supervisor,
}

impl HttpBridge {
    pub fn new(backend: BackendClient, supervisor: Supervisor) -> Self {
        Self {
            backend,
            supervisor,
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PolyNeural.ai knowledge graph tools served through an HTTP bridge".to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    /// Forward one method and hand the backend's `result` back as-is.
    ///
    /// `initialize` is the exception: the handshake needs an `InitializeResult`.
    async fn dispatch(
        &self,
        method: McpMethod,
        params: Value,
        id: Option<Value>,
        ct: CancellationToken,
    ) -> std::result::Result<ServerResult, McpError> {
        if self.backend.config().debug {
            debug!("Handling {} request", method);
        }

        self.forward(method, params, id, &ct).await.map_err(|e| {
            warn!(method = %method, kind = e.kind(), error = %e, "Request failed");
            e.into()
        })
    }

    async fn forward(
        &self,
        method: McpMethod,
        params: Value,
        id: Option<Value>,
        ct: &CancellationToken,
    ) -> Result<ServerResult> {
        let value = self.backend.forward(method, id, params, ct).await?;
        match method {
            McpMethod::Initialize => {
                decode_result::<InitializeResult>(method, value).map(ServerResult::InitializeResult)
            }
            McpMethod::ToolsList | McpMethod::ToolsCall => {
                passthrough_result(method, value).map(ServerResult::CustomResult)
            }
        }
    }

    async fn route(
        &self,
        request: ClientRequest,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<ServerResult, McpError> {
        let method = match &request {
            ClientRequest::InitializeRequest(_) => McpMethod::Initialize,
            ClientRequest::ListToolsRequest(_) => McpMethod::ToolsList,
            ClientRequest::CallToolRequest(call) => {
                if self.backend.config().debug {
                    debug!("Handling tool call: {}", call.params.name);
                }
                McpMethod::ToolsCall
            }
            ClientRequest::PingRequest(_) => return Ok(ServerResult::empty(())),
            other => {
                return Err(McpError::new(
                    ErrorCode::METHOD_NOT_FOUND,
                    other.method().to_string(),
                    None,
                ));
            }
        };

        let params = match method {
            McpMethod::ToolsList => json!({}),
            _ => inbound_params(&request)?,
        };

        self.supervisor
            .guard(
                method.as_str(),
                self.dispatch(method, params, request_id(&context), context.ct.clone()),
            )
            .await
    }
}

fn request_id(context: &RequestContext<RoleServer>) -> Option<Value> {
    serde_json::to_value(&context.id).ok()
}

/// The `params` object of an inbound request as the client sent it, `_meta` included
pub(crate) fn inbound_params<R: Serialize>(request: &R) -> std::result::Result<Value, McpError> {
    let mut value = serde_json::to_value(request)
        .map_err(|e| McpError::invalid_params(format!("Unable to encode params: {}", e), None))?;
    Ok(value
        .get_mut("params")
        .map(Value::take)
        .unwrap_or_else(|| json!({})))
}

/// Decode a backend `result` into the typed payload the handshake requires
pub(crate) fn decode_result<T: DeserializeOwned>(method: McpMethod, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        BridgeError::MalformedResponse(format!("invalid {} result: {}", method, e))
    })
}

/// Wrap a backend `result` untouched; a body without one is malformed
pub(crate) fn passthrough_result(method: McpMethod, value: Value) -> Result<CustomResult> {
    if value.is_null() {
        return Err(BridgeError::MalformedResponse(format!(
            "missing {} result",
            method
        )));
    }
    Ok(CustomResult::new(value))
}

impl Service<RoleServer> for HttpBridge {
    async fn handle_request(
        &self,
        request: ClientRequest,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<ServerResult, McpError> {
        self.route(request, context).await
    }

    async fn handle_notification(
        &self,
        notification: ClientNotification,
        _context: NotificationContext<RoleServer>,
    ) -> std::result::Result<(), McpError> {
        if let ClientNotification::InitializedNotification(_) = notification {
            debug!("Client initialized");
        }
        Ok(())
    }

    fn get_info(&self) -> ServerInfo {
        self.info()
    }
}
