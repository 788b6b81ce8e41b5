//! WafGuard - Main Entry Point

use std::process::ExitCode;

use clap::Parser;
use wafguard::{Cli, Command, commands, logging};
use wafguard_application::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.command.log().to_config()) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let (token, cancel) = CancellationToken::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling in-flight tests");
            token.cancel();
        }
    });

    let result = match &cli.command {
        Command::Run(args) => commands::run(args, &cancel)
            .await
            .map(|outcome| outcome.is_none_or(|o| o.failed_tests() == 0 && !o.cancelled())),
        Command::Validate(args) => commands::validate(args).await.map(|_| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            ExitCode::FAILURE
        }
    }
}
