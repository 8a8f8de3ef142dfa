//! OS Agent - Entry Point
//!
//! Wires the language backend, action dispatcher and the chosen console
//! together, then runs the control loop until the user exits or presses
//! Ctrl-C.

use os_agent::actions::ActionCatalog;
use os_agent::command::{ActionDispatcher, DispatchSettings, PathResolver, SystemDesktop};
use os_agent::core::config::{resolve_api_key, AgentConfig};
use os_agent::core::error::Result;
use os_agent::llm::{CommandParser, LlmClient};
use os_agent::session::{Console, ControlLoop, Emission, TextConsole, VoiceConsole};

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Voice,
    Text,
}

/// OS Agent - voice/text system controller
#[derive(Parser, Debug)]
#[command(name = "os-agent")]
#[command(about = "Control your computer with natural language commands")]
struct Args {
    /// Input mode
    #[arg(long, value_enum, default_value = "voice")]
    mode: Mode,

    /// Config file (defaults to os-agent.toml in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "os_agent=debug"
    } else {
        "os_agent=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Create the async runtime for backend calls, shell commands and the console
    let rt = Runtime::new()?;
    let result = rt.block_on(run(args));

    // A pending stdin read sits on a blocking thread; don't wait for it
    rt.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(args: Args) -> Result<()> {
    println!("Initializing OS Agent...");

    let config = AgentConfig::load(args.config.as_deref())?;
    let api_key = resolve_api_key(Path::new(".env"))?;

    let catalog = ActionCatalog::new();
    let backend = Arc::new(LlmClient::from_config(&config.llm, api_key));
    let parser = CommandParser::new(backend, &catalog);
    let dispatcher = ActionDispatcher::new(
        catalog,
        Arc::new(SystemDesktop::new()),
        PathResolver::for_current_user(),
        DispatchSettings::from_config(&config.dispatch),
    );

    tracing::info!(mode = ?args.mode, model = %config.llm.model, "OS Agent starting");

    match args.mode {
        Mode::Voice => {
            let mut console = VoiceConsole::start(&config.voice).await?;
            console
                .emit("OS Agent initialized. I'm ready to help!", Emission::Blocking)
                .await?;
            print_banner("Speak your commands. Say 'exit' or 'quit' to stop.");
            run_session(ControlLoop::new(parser, dispatcher, console, &config.session)).await;
        }
        Mode::Text => {
            println!("OS Agent initialized in TEXT mode. Type 'exit' to quit.");
            print_banner("Type your commands. Type 'exit' or 'quit' to stop.");
            let console = TextConsole::stdio();
            run_session(ControlLoop::new(parser, dispatcher, console, &config.session)).await;
        }
    }

    println!("\nOS Agent terminated.");
    Ok(())
}

async fn run_session<C: Console>(mut session: ControlLoop<C>) {
    session
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            println!("\n\nInterrupted by user.");
        })
        .await;
}

fn print_banner(hint: &str) {
    println!("\n{}", "=".repeat(60));
    println!("OS AGENT ACTIVE");
    println!("{}", "=".repeat(60));
    println!("{}", hint);
    println!("{}\n", "=".repeat(60));
}
