use clap::{Parser, Subcommand};
use std::io::Read;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use hookguard::audit::AuditLog;
use hookguard::config::NotificationEvent;
use hookguard::hook::{HookOutcome, ToolInvocationRequest, BLOCK_EXIT_CODE, PRE_TOOL_USE};
use hookguard::safety::{self, Decision};

#[derive(Parser)]
#[command(name = "hookguard")]
#[command(about = "Guard hooks for agent tool calls", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Pre-tool-use hook: read the tool call as JSON on stdin, exit 2 with a message on stderr to block it.
    PreToolUse {
        /// Directory for the audit log (default: ./logs)
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },

    /// Classify a command (or a file path with --tool) and print the verdict.
    Check {
        /// Tool name; file tools (Read, Edit, MultiEdit, Write) treat TARGET as a file path
        #[arg(long, short, default_value = "Bash")]
        tool: String,

        /// Command text or file path
        #[arg(required = true, num_args = 1.., value_name = "TARGET")]
        target: Vec<String>,
    },

    /// Speak a notification (text from arguments, else stdin, else a completion phrase).
    Speak {
        /// Config file path (default: HOOKGUARD_CONFIG_PATH or ~/.hookguard/tts_config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Notification event (task_complete, user_input, subagent_complete, error)
        #[arg(long, short)]
        event: Option<String>,

        /// Text to speak
        text: Vec<String>,
    },

    /// Write the default speech config if none exists.
    Init {
        /// Config file path (default: HOOKGUARD_CONFIG_PATH or ~/.hookguard/tts_config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("hookguard {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::PreToolUse { log_dir }) => {
            let outcome = run_pre_tool_use(log_dir);
            if let Some(message) = outcome.message() {
                eprintln!("{}", message);
            }
            std::process::exit(outcome.exit_code());
        }
        Some(Commands::Check { tool, target }) => {
            run_check(&tool, &target.join(" "));
        }
        Some(Commands::Speak {
            config,
            event,
            text,
        }) => {
            if let Err(e) = run_speak(config, event, text).await {
                log::error!("speak failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

/// Outermost fail-open boundary: a panic anywhere in the hook allows the call,
/// silently (the panic hook is replaced so nothing reaches stderr).
fn run_pre_tool_use(log_dir: Option<PathBuf>) -> HookOutcome {
    std::panic::set_hook(Box::new(|info| {
        log::debug!("pre-tool-use hook panicked: {}", info);
    }));
    std::panic::catch_unwind(AssertUnwindSafe(|| {
        let audit = match log_dir {
            Some(dir) => AuditLog::new(dir, PRE_TOOL_USE),
            None => AuditLog::in_current_dir(PRE_TOOL_USE),
        };
        hookguard::hook::run_pre_tool_use(std::io::stdin().lock(), &audit)
    }))
    .unwrap_or_else(|_| {
        log::debug!("pre-tool-use hook panicked, allowing");
        HookOutcome::Allow
    })
}

fn run_check(tool: &str, target: &str) {
    let request = if tool == "Bash" {
        ToolInvocationRequest::bash(target)
    } else {
        ToolInvocationRequest::file(tool, target)
    };
    match safety::classify(&request) {
        Decision::Allow => println!("allow"),
        Decision::Block(category) => {
            println!("block ({})", category.label());
            println!("{}", category);
            std::process::exit(BLOCK_EXIT_CODE);
        }
    }
}

async fn run_speak(
    config_path: Option<PathBuf>,
    event: Option<String>,
    text: Vec<String>,
) -> anyhow::Result<()> {
    let (config, path) = hookguard::config::load_config(config_path);
    log::debug!("loaded speech config from {}", path.display());

    let event = event.as_deref().and_then(NotificationEvent::from_arg);
    if !config.should_notify(event) {
        log::info!("notification suppressed by config");
        return Ok(());
    }
    match config.preferred_provider() {
        None => {
            log::info!("no speech provider enabled");
            return Ok(());
        }
        Some(provider) if provider != hookguard::config::OFFLINE => {
            log::info!("provider {} has no local engine, speaking offline", provider);
        }
        Some(_) => {}
    }

    let stdin_text = if text.is_empty() {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        Some(s)
    } else {
        None
    };
    let text = hookguard::tts::resolve_text(&text, stdin_text.as_deref());

    let speaker = hookguard::tts::Speaker::from_config(&config);
    let engine = speaker.speak(&text).await?;
    println!("spoke via {}: {}", engine.binary(), text);
    Ok(())
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(hookguard::config::default_config_path);
    let dir = hookguard::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}
