//! Sketch Bridge MCP Server — entry point.

use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use sketch_bridge::{BridgeConfig, SketchBridge};
use sketch_bridge_mcp::config::resolve_bridge_config;
use sketch_bridge_mcp::protocol::ProtocolHandler;
use sketch_bridge_mcp::tools::ToolRegistry;
use sketch_bridge_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "sketch-bridge-mcp",
    about = "MCP server for Sketch Bridge — run and edit Processing sketches from an LLM",
    version
)]
struct Cli {
    #[command(flatten)]
    bridge: BridgeArgs,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct BridgeArgs {
    /// Directory containing one folder per sketch.
    /// Also reads SKETCH_ROOT.
    #[arg(long, global = true)]
    sketch_root: Option<String>,

    /// Path to the processing-java runner.
    /// Also reads SKETCH_RUNNER.
    #[arg(long, global = true)]
    runner: Option<String>,

    /// Seconds to wait for the runner before treating it as started.
    /// Also reads SKETCH_RUN_TIMEOUT_SECS.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl BridgeArgs {
    fn resolve(&self) -> BridgeConfig {
        resolve_bridge_config(
            self.sketch_root.as_deref(),
            self.runner.as_deref(),
            self.timeout_secs,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Check that the sketch directory and runner exist.
    Validate,

    /// List sketches in the sketch directory.
    List,

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   sketch-bridge-mcp completions bash > ~/.local/share/bash-completion/completions/sketch-bridge-mcp
    ///   sketch-bridge-mcp completions zsh > ~/.zfunc/_sketch-bridge-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    // stdout carries JSON-RPC frames; logs must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.bridge.resolve();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("Sketch Bridge MCP server");
            tracing::info!("Sketch root: {}", config.sketch_root.display());
            tracing::info!("Runner: {}", config.runner_path.display());
            if !config.runner_path.exists() {
                tracing::warn!("Runner not found; run_sketch will report an error until it exists");
            }

            let bridge = Arc::new(SketchBridge::new(config));
            let handler = ProtocolHandler::new(bridge);
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Validate => {
            let mut ok = true;
            for (label, path, want_dir) in [
                ("Sketch root", &config.sketch_root, true),
                ("Runner", &config.runner_path, false),
            ] {
                let found = if want_dir { path.is_dir() } else { path.is_file() };
                println!(
                    "{label:<12} {} ({})",
                    path.display(),
                    if found { "ok" } else { "missing" }
                );
                ok &= found;
            }
            println!("Timeout      {}s", config.launch_timeout.as_secs());
            if !ok {
                std::process::exit(1);
            }
        }

        Commands::List => {
            let bridge = SketchBridge::new(config);
            match bridge.list() {
                Ok(names) if names.is_empty() => {
                    println!("No sketches found in {}.", bridge.config().sketch_root.display());
                }
                Ok(names) => {
                    for name in names {
                        println!("{name}");
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Info => {
            let capabilities = sketch_bridge_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "sketch_root": config.sketch_root,
                "runner": config.runner_path,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sketch-bridge-mcp", &mut std::io::stdout());
        }

        Commands::Repl => {
            // The REPL blocks on stdin; keep it off the async workers.
            tokio::task::spawn_blocking(move || sketch_bridge_mcp::repl::run(config)).await??;
        }
    }

    Ok(())
}
