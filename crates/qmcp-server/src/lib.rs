//! Quantum circuit tools over the Model Context Protocol
//!
//! This crate exposes a circuit workbench to AI agents: circuits are
//! created and extended by name, then run, analyzed, optimized and drawn
//! through MCP tool calls over newline-delimited JSON-RPC on stdio.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      McpServer (server.rs)                │
//! │   initialize · tools/list · tools/call · ping · shutdown  │
//! └──────────────────────────────┬───────────────────────────┘
//!                                │ ToolCall
//! ┌──────────────────────────────▼───────────────────────────┐
//! │                   QuantumTools (tools/)                   │
//! │  CircuitRegistry ── named circuits                       │
//! │  QuantumBackend  ── transpile, run, states, optimize     │
//! │  diagram         ── text and Mermaid renderings          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qmcp_server::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let server = Arc::new(McpServer::from_config(&Config::default()));
//!     server.run_stdio().await
//! }
//! ```

pub mod backend;
pub mod config;
pub mod diagram;
pub mod error;
pub mod gates;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;
pub mod tracing_config;

// Re-export commonly used types
pub use backend::{LocalBackend, QuantumBackend};
pub use config::{Config, ConfigError};
pub use error::{BackendError, BackendResult, ToolCallError, ToolError};
pub use registry::CircuitRegistry;
pub use server::McpServer;
pub use tools::{QuantumTools, ToolCall, ToolLimits};
pub use tracing_config::{TracingConfig, TracingFormat, init_tracing};
