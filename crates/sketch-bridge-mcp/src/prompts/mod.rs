//! MCP prompt implementations.

pub mod new_sketch;
pub mod registry;
pub mod revise_sketch;

pub use registry::PromptRegistry;
