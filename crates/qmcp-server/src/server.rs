//! MCP protocol server implementation
//!
//! Implements the Model Context Protocol over newline-delimited JSON-RPC
//! for stdio-based communication with AI agents.

use std::io;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use qmcp_sim::Simulator;

use crate::backend::LocalBackend;
use crate::config::Config;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcRequest, JsonRpcResponse, McpError,
    PROTOCOL_VERSION, ServerCapabilities, ServerInfo,
};
use crate::registry::CircuitRegistry;
use crate::tools::{QuantumTools, ToolCall, ToolLimits};

/// The MCP server: protocol handling around [`QuantumTools`].
pub struct McpServer {
    tools: QuantumTools,
    server_info: ServerInfo,
}

fn to_value<T: Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::Internal(e.to_string()))
}

impl McpServer {
    /// Create a server around an existing tool set.
    pub fn new(tools: QuantumTools, name: impl Into<String>) -> Self {
        Self {
            tools,
            server_info: ServerInfo {
                name: name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Create a server with a fresh registry and the local backend.
    pub fn from_config(config: &Config) -> Self {
        let simulator = Simulator::new()
            .with_max_qubits(config.simulator.max_qubits)
            .with_seed(config.simulator.seed);
        let tools = QuantumTools::new(
            Arc::new(CircuitRegistry::new()),
            Arc::new(LocalBackend::new(simulator)),
            ToolLimits::from(&config.simulator),
        );
        Self::new(tools, config.server.name.clone())
    }

    /// The tool set.
    pub fn tools(&self) -> &QuantumTools {
        &self.tools
    }

    /// Run the server on stdio
    pub async fn run_stdio(self: Arc<Self>) -> io::Result<()> {
        info!(name = %self.server_info.name, "starting MCP server on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve requests from `reader` until end of input.
    ///
    /// Each request is handled in its own task; responses go through a
    /// single writer task, one line each, in completion order.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<(), io::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!(message = %line, "received");

            let server = Arc::clone(&self);
            let tx = tx.clone();
            in_flight.spawn(async move {
                let Some(response) = server.handle_message(&line).await else {
                    return;
                };
                match serde_json::to_string(&response) {
                    Ok(text) => {
                        debug!(message = %text, "sending");
                        if tx.send(text).is_err() {
                            warn!("response dropped: writer closed");
                        }
                    }
                    Err(e) => error!(error = %e, "failed to serialize response"),
                }
            });

            while let Some(done) = in_flight.try_join_next() {
                if let Err(e) = done {
                    error!(error = %e, "request task failed");
                }
            }
        }

        while let Some(done) = in_flight.join_next().await {
            if let Err(e) = done {
                error!(error = %e, "request task failed");
            }
        }
        drop(tx);
        writer_task.await.map_err(io::Error::other)?
    }

    /// Handle one line of input. Notifications produce no response.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "failed to parse request");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    &McpError::Parse(e.to_string()),
                ));
            }
        };

        if !value.is_object() {
            return Some(JsonRpcResponse::error(
                Value::Null,
                &McpError::InvalidRequest("expected a JSON object".to_string()),
            ));
        }
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "malformed request");
                return Some(JsonRpcResponse::error(
                    id,
                    &McpError::InvalidRequest(e.to_string()),
                ));
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }

        let method = request.method.clone();
        Some(match self.handle_request(request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                warn!(%method, code = e.code(), error = %e, "request rejected");
                JsonRpcResponse::error(id, &e)
            }
        })
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Result<Value, McpError> {
        match request.method.as_str() {
            "initialize" => {
                info!("handling initialize");
                to_value(InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities::default(),
                    server_info: self.server_info.clone(),
                })
            }
            "ping" => Ok(json!({})),
            "shutdown" => {
                info!("received shutdown request");
                Ok(json!({}))
            }
            "tools/list" => Ok(json!({ "tools": self.tools.list_tools() })),
            "tools/call" => {
                let params: CallToolParams = serde_json::from_value(request.params)
                    .map_err(|e| McpError::InvalidParams(e.to_string()))?;
                let call = ToolCall::parse(&params.name, params.arguments)?;
                info!(tool = call.name(), "tool call");
                let outcome = self.tools.execute(call).await;
                to_value(CallToolResult::from(outcome))
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }
}
