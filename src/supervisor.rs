//! Top-level fault boundary.
//!
//! Handler errors are ordinary per-request failures. A panic inside a handler
//! is not: the supervisor records it, cancels the service token and the
//! process exits non-zero once the service loop has stopped.

use futures::FutureExt;
use rmcp::ErrorData as McpError;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::error;

#[derive(Clone, Default)]
pub struct Supervisor {
    shutdown: CancellationToken,
    fault: Arc<Mutex<Option<String>>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that stops the service when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run a handler future, escalating a panic into a service shutdown
    pub async fn guard<T, F>(&self, operation: &'static str, fut: F) -> Result<T, McpError>
    where
        F: Future<Output = Result<T, McpError>>,
    {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let message = format!("{} handler panicked: {}", operation, panic_message(&*payload));
                self.escalate(message);
                Err(McpError::internal_error("Internal bridge fault", None))
            }
        }
    }

    /// Record an unrecoverable fault and stop the service
    pub fn escalate(&self, message: String) {
        error!("Unrecoverable fault: {}", message);
        if let Ok(mut fault) = self.fault.lock() {
            // Keep the first fault, later ones are usually fallout.
            if fault.is_none() {
                *fault = Some(message);
            }
        }
        self.shutdown.cancel();
    }

    pub fn fault(&self) -> Option<String> {
        self.fault.lock().ok().and_then(|fault| fault.clone())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
