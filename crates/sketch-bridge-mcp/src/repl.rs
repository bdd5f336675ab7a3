//! Interactive REPL for the Sketch Bridge MCP server.
//!
//! Launch with `sketch-bridge-mcp repl` to enter interactive mode.
//! Type `/help` for available commands, Tab for completion.

use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::{Map, Value};

use sketch_bridge::{BridgeConfig, LaunchOutcome, SketchBridge, SketchStore};

use crate::tools::ToolRegistry;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/info", "Show server capabilities and tools"),
    ("/tools", "List available MCP tools"),
    ("/validate", "Check the sketch directory and runner"),
    ("/list", "List sketches"),
    ("/show", "Print a sketch's source"),
    ("/run", "Run a sketch: /run <name> [json params]"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// Commands whose first argument is a sketch name.
const SKETCH_COMMANDS: &[&str] = &["/show", "/run"];

/// REPL helper for tab completion.
struct SketchHelper {
    store: SketchStore,
}

impl Completer for SketchHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        let Some((cmd, args)) = input.split_once(' ') else {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        };

        // Only the first argument is a sketch name.
        if SKETCH_COMMANDS.contains(&cmd) && !args.contains(' ') {
            let names = self.store.list().unwrap_or_default();
            let prefix_start = input.len() - args.len();
            let matches: Vec<Pair> = names
                .into_iter()
                .filter(|n| n.starts_with(args))
                .map(|n| Pair {
                    display: n.clone(),
                    replacement: format!("{n} "),
                })
                .collect();
            return Ok((prefix_start, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for SketchHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .map(|(cmd, _)| *cmd)
            .find(|cmd| cmd.starts_with(line) && *cmd != line)
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for SketchHelper {}
impl Validator for SketchHelper {}
impl Helper for SketchHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

fn history_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".sketch_bridge_mcp_history")
}

/// Run the interactive REPL against `config`.
///
/// Must be called from a blocking context: `/run` drives the async
/// launcher on the current tokio runtime, or a private one if none exists.
/// Either way a worker thread keeps servicing launched runners' output
/// between prompts.
pub fn run(config: BridgeConfig) -> anyhow::Result<()> {
    let bridge = SketchBridge::new(config);
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(handle) => RuntimeHandle::Shared(handle),
        Err(_) => RuntimeHandle::Owned(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()?,
        ),
    };

    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1msketch-bridge-mcp v{}\x1b[0m \x1b[90m\u{2014} Processing sketches for AI agents\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!(
        "    Sketches in \x1b[36m{}\x1b[0m",
        bridge.config().sketch_root.display()
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<SketchHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(rl_config)?;
    rl.set_helper(Some(SketchHelper {
        store: bridge.store().clone(),
    }));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36msketch>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                let args = args.trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(),
                    "tools" => cmd_tools(),
                    "validate" => cmd_validate(&bridge),
                    "list" | "ls" => cmd_list(&bridge),
                    "show" | "cat" => cmd_show(args, &bridge),
                    "run" => cmd_run(args, &bridge, &runtime),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

enum RuntimeHandle {
    Shared(tokio::runtime::Handle),
    Owned(tokio::runtime::Runtime),
}

impl RuntimeHandle {
    fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        match self {
            RuntimeHandle::Shared(handle) => handle.block_on(fut),
            RuntimeHandle::Owned(rt) => rt.block_on(fut),
        }
    }
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completes commands and sketch names.");
    eprintln!();
}

fn cmd_info() {
    let capabilities = crate::types::InitializeResult::default_result();
    let tools = ToolRegistry::list_tools();
    eprintln!();
    eprintln!(
        "  Server:   {} v{}",
        capabilities.server_info.name, capabilities.server_info.version
    );
    eprintln!("  Protocol: {}", capabilities.protocol_version);
    eprintln!("  Tools:    {}", tools.len());
    eprintln!();
}

fn cmd_tools() {
    let tools = ToolRegistry::list_tools();
    eprintln!();
    eprintln!("  {} MCP tools available:", tools.len());
    eprintln!();
    for tool in &tools {
        eprintln!(
            "    {:<18} {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

fn cmd_validate(bridge: &SketchBridge) {
    let config = bridge.config();
    let mark = |ok: bool| if ok { "\x1b[32mok\x1b[0m" } else { "\x1b[31mmissing\x1b[0m" };
    eprintln!();
    eprintln!(
        "  Sketch root: {} ({})",
        config.sketch_root.display(),
        mark(config.sketch_root.is_dir())
    );
    eprintln!(
        "  Runner:      {} ({})",
        config.runner_path.display(),
        mark(config.runner_path.is_file())
    );
    eprintln!("  Timeout:     {}s", config.launch_timeout.as_secs());
    eprintln!();
}

fn cmd_list(bridge: &SketchBridge) {
    match bridge.list() {
        Ok(names) if names.is_empty() => {
            eprintln!("  No sketches found in {}.", bridge.config().sketch_root.display());
        }
        Ok(names) => {
            eprintln!();
            for name in &names {
                eprintln!("    {name}");
            }
            eprintln!();
            eprintln!("  {} sketch(es)", names.len());
        }
        Err(e) => eprintln!("  Error: {e}"),
    }
}

fn cmd_show(args: &str, bridge: &SketchBridge) {
    let Some(name) = args.split_whitespace().next() else {
        eprintln!("  Usage: /show <sketch>");
        return;
    };
    match bridge.read(name) {
        Ok(code) => {
            eprintln!();
            for line in code.lines() {
                eprintln!("    {line}");
            }
            eprintln!();
        }
        Err(e) => eprintln!("  Error: {e}"),
    }
}

fn cmd_run(args: &str, bridge: &SketchBridge, runtime: &RuntimeHandle) {
    let (name, raw_params) = args.split_once(' ').unwrap_or((args, ""));
    if name.is_empty() {
        eprintln!("  Usage: /run <sketch> [json params]");
        return;
    }

    let params: Map<String, Value> = if raw_params.trim().is_empty() {
        Map::new()
    } else {
        match serde_json::from_str(raw_params) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("  Params must be a JSON object: {e}");
                return;
            }
        }
    };

    match runtime.block_on(bridge.run(name, &params)) {
        Ok(LaunchOutcome::Started) => eprintln!("  Sketch {name} started."),
        Ok(LaunchOutcome::StartedWithWarning(detail)) => {
            eprintln!("  Sketch {name} reported errors:\n{detail}");
        }
        Ok(LaunchOutcome::FailedToStart(reason)) => {
            eprintln!("  Sketch {name} failed to start: {reason}");
        }
        Err(e) => eprintln!("  Error: {e}"),
    }
}
