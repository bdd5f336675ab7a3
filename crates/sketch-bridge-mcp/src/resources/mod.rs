//! MCP resource implementations.

pub mod registry;
pub mod sketches;
pub mod source;
pub mod templates;

pub use registry::ResourceRegistry;

/// URI scheme for every resource this server exposes.
pub const SCHEME: &str = "sketch://";
