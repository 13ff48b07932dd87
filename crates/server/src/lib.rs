//! `rentaldesk-server` — protocol layer and process wiring.
//!
//! Structure:
//! - `rpc.rs`: JSON-RPC 2.0 envelopes
//! - `mcp.rs`: agent-protocol method handlers (`initialize`, `tools/list`,
//!   `tools/call`)
//! - `stdio.rs`: line-delimited stdio transport (the default)
//! - `http.rs`: optional HTTP transport serving the same dispatch
//! - `config.rs`: server-side environment configuration

pub mod config;
pub mod http;
pub mod mcp;
pub mod rpc;
pub mod stdio;

pub use config::ServerConfig;
pub use mcp::McpServer;
