mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use enzprop::engine::cancel::CancellationToken;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received; finishing the current block before stopping.");
                eprintln!("\nInterrupt received, stopping after the current block...");
                signal_token.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let command_result = async {
        info!("enzprop CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
        debug!("Full CLI arguments parsed: {:?}", &cli);

        if let Some(num_threads) = cli.threads {
            if num_threads == 0 {
                return Err(CliError::Argument(
                    "--threads must be at least 1".to_string(),
                ));
            }
            info!(
                "Setting Rayon global thread pool to {} threads.",
                num_threads
            );
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
                })?;
        }

        match cli.command {
            Commands::Load(args) => {
                info!("Dispatching to 'load' command.");
                commands::load::run(args).await
            }
            Commands::Build(args) => {
                info!("Dispatching to 'build' command.");
                commands::build::run(args, cancel).await
            }
            Commands::Propagate(args) => {
                info!("Dispatching to 'propagate' command.");
                commands::propagate::run(args, cancel).await
            }
            Commands::Run(args) => {
                info!("Dispatching to 'run' command.");
                commands::run::run(args, cancel).await
            }
            Commands::Show(args) => {
                info!("Dispatching to 'show' command.");
                commands::show::run(args).await
            }
        }
    }
    .await;

    match &command_result {
        Ok(_) => {
            info!("Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("❌ Command failed: {}", e);
        }
    }

    command_result
}
