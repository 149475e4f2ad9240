#![allow(dead_code)]

use httpmock::prelude::*;
use polyneural_bridge::{
    backend::BackendClient, config::BridgeConfig, mcp::HttpBridge, serve, supervisor::Supervisor,
};
use rmcp::service::{RoleClient, RunningService};
use rmcp::ServiceExt;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};
use tokio::task::JoinHandle;

pub const TEST_API_KEY: &str = "kg_integration";

// ──────────────────────────────────────────────
// Backend side
// ──────────────────────────────────────────────

pub fn backend_for(server: &MockServer, timeout: Duration) -> BackendClient {
    BackendClient::new(BridgeConfig::new(server.base_url(), TEST_API_KEY, timeout)).unwrap()
}

/// `result` payload the fake backend answers `initialize` with.
pub fn initialize_result() -> Value {
    json!({
        "protocolVersion": "2025-03-26",
        "capabilities": {"tools": {"listChanged": false}},
        "serverInfo": {"name": "polyneural-kg", "version": "2.1.0"},
        "instructions": "Knowledge graph tools"
    })
}

pub async fn mock_initialize(server: &MockServer) {
    let body = json!({"jsonrpc": "2.0", "id": 1, "result": initialize_result()});
    server
        .mock_async(move |when, then| {
            when.method(POST).path("/mcp/initialize");
            then.status(200).json_body(body);
        })
        .await;
}

// ──────────────────────────────────────────────
// Host side
// ──────────────────────────────────────────────

pub struct Session {
    pub client: RunningService<RoleClient, ()>,
    pub supervisor: Supervisor,
    pub server: JoinHandle<anyhow::Result<()>>,
}

/// Run the bridge over an in-memory pipe and connect an MCP client to it.
pub async fn connect(backend: BackendClient) -> Session {
    let supervisor = Supervisor::new();
    let bridge = HttpBridge::new(backend, supervisor.clone());

    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    let server = tokio::spawn(serve::run(
        bridge,
        supervisor.clone(),
        tokio::io::split(server_io),
    ));

    let client = ().serve(tokio::io::split(client_io)).await.unwrap();

    Session {
        client,
        supervisor,
        server,
    }
}

/// Client that speaks newline-delimited JSON-RPC directly, with no model types in between.
pub struct RawSession {
    writer: WriteHalf<DuplexStream>,
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    pub server: JoinHandle<anyhow::Result<()>>,
}

impl RawSession {
    pub async fn send(&mut self, message: Value) {
        let mut line = serde_json::to_vec(&message).unwrap();
        line.push(b'\n');
        self.writer.write_all(&line).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    pub async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("no frame from bridge")
            .unwrap()
            .expect("bridge closed the stream");
        serde_json::from_str(&line).unwrap()
    }

    /// Send a request and wait for its response frame.
    pub async fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        self.recv().await
    }

    /// Close the client side and wait for the bridge to stop.
    pub async fn close(self) -> anyhow::Result<()> {
        drop(self.writer);
        drop(self.lines);
        self.server.await.unwrap()
    }
}

/// Run the bridge over an in-memory pipe and complete the handshake with raw frames.
pub async fn connect_raw(backend: BackendClient) -> RawSession {
    let supervisor = Supervisor::new();
    let bridge = HttpBridge::new(backend, supervisor.clone());

    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    let server = tokio::spawn(serve::run(
        bridge,
        supervisor,
        tokio::io::split(server_io),
    ));

    let (reader, writer) = tokio::io::split(client_io);
    let mut session = RawSession {
        writer,
        lines: BufReader::new(reader).lines(),
        server,
    };

    let response = session
        .request(
            1,
            "initialize",
            json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "raw-client", "version": "0.0.1"}
            }),
        )
        .await;
    assert_eq!(response["id"], 1, "unexpected handshake reply: {}", response);
    session
        .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;

    session
}
