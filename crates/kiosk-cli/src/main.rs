//! `kiosk`: card scan service and directory administration.
//!
//! Without a subcommand the scan loop runs until SIGINT/SIGTERM.

mod admin;
mod config;
mod logging;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kiosk_directory::Directory;
use kiosk_hardware::{AnyCardReader, ReaderMode};
use kiosk_scanner::ScanCoordinator;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::admin::UserCommand;
use crate::config::{KioskConfig, LogConfig};

#[derive(Parser, Debug)]
#[command(name = "kiosk", version, about = "Card kiosk scan service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the card reader and log authentication events (default)
    Run {
        /// Reader to use, overriding KIOSK_READER
        #[arg(long)]
        reader: Option<ReaderMode>,

        /// Serial device, overriding KIOSK_SERIAL_PORT
        #[arg(long)]
        port: Option<String>,
    },

    /// Manage users in the directory
    #[command(subcommand)]
    User(UserCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    config::load_dotenv();

    let log_config = match LogConfig::from_env() {
        Ok(log_config) => log_config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(&log_config) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let config = match KioskConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    let directory = match Directory::connect(&config.directory) {
        Ok(directory) => directory,
        Err(e) => {
            error!(error = %e, "Invalid directory configuration");
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Run {
        reader: None,
        port: None,
    }) {
        Command::Run { reader, port } => run(config, directory, reader, port).await,
        Command::User(command) => match admin::execute(&directory, command).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Command failed");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(
    mut config: KioskConfig,
    directory: Directory,
    reader: Option<ReaderMode>,
    port: Option<String>,
) -> ExitCode {
    if let Some(mode) = reader {
        config.reader_mode = mode;
    }
    if let Some(port) = port {
        config.serial.port_path = port;
    }

    info!(
        version = kiosk_core::VERSION,
        reader = %config.reader_mode,
        directory = %config.directory.base_url,
        "Starting kiosk scan service"
    );

    let reader = AnyCardReader::open(config.reader_mode, &config.serial);
    if reader.mode() != config.reader_mode {
        warn!(
            requested = %config.reader_mode,
            active = %reader.mode(),
            "Running without the requested card reader"
        );
    }

    let (users, auth_logs) = directory.into_parts();
    let mut scanner = ScanCoordinator::new(reader, users, auth_logs, config.scan);

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let stats = scanner.run(shutdown).await;
    info!(accepted = stats.accepted, "Kiosk scan service stopped");
    ExitCode::SUCCESS
}

/// Cancel `token` on Ctrl-C, or SIGTERM on Unix.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Interrupt received, shutting down"),
        _ = terminate => info!("Termination requested, shutting down"),
    }

    token.cancel();
}
