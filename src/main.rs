use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use skysense::config::SkySenseConfig;
use skysense::dispatcher::Dispatcher;
use skysense::{SkySenseError, logging, web};

#[derive(Parser)]
#[command(name = "skysense", version, about = "Conversational weather assistant backend")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the chat API (default)
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Answer a single message and exit
    Ask {
        /// The message to answer
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> skysense::Result<()> {
    let mut config =
        SkySenseConfig::load_from_path(cli.config).map_err(SkySenseError::config_from)?;
    logging::init(&config.logging, cli.verbose)
        .map_err(|e| SkySenseError::general(e.to_string()))?;

    let dispatcher = Dispatcher::from_config(&config)
        .map_err(|e| SkySenseError::general(format!("Failed to start remote clients: {e:#}")))?;
    let dispatcher = Arc::new(dispatcher);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(
                strategy = ?dispatcher.strategy(),
                completion_enabled = dispatcher.completion_enabled(),
                "Starting SkySense {}",
                skysense::VERSION
            );
            web::run(&config.server, dispatcher).await
        }
        Command::Ask { message } => {
            let reply = dispatcher.respond(&message.join(" ")).await;
            println!("{reply}");
            Ok(())
        }
    }
}
