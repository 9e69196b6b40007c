use anyhow::Result;
use clap::Parser;
use drive_bucket::cli::{load_env, run, Cli, Commands};
use drive_bucket::logging;
use drive_bucket_core::config::DEFAULT_LOG_LEVEL;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment before logging so LOG_LEVEL is honoured
    let Commands::Sync { env_file } = &cli.command;
    load_env(env_file.as_ref())?;

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    logging::init(&level);
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %format!("{e:#}"), "CLI exited with error"),
    }
    result
}
