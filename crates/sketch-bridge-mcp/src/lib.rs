//! Sketch Bridge MCP Server — run, list, create, and update Processing sketches over MCP.

pub mod config;
pub mod prompts;
pub mod protocol;
pub mod repl;
pub mod resources;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::resolve_bridge_config;
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;
