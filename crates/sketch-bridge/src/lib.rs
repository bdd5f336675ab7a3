//! Sketch Bridge — core library for managing and launching Processing sketches.

pub mod bridge;
pub mod config;
pub mod launcher;
pub mod store;
pub mod types;

pub use bridge::SketchBridge;
pub use config::{BridgeConfig, DEFAULT_LAUNCH_TIMEOUT, DEFAULT_SOURCE_EXTENSION};
pub use launcher::{runner_args, RunnerLauncher};
pub use store::SketchStore;
pub use types::*;
