use anyhow::Result;
use clap::Parser;

mod api;
mod cli;
mod config;
mod data_paths;
mod logging;
mod view;
mod walkthrough;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI and execute (the command handles logging initialization)
    let cli = cli::Cli::parse();

    match cli.execute().await {
        Ok(()) => {
            logging::log_session_end();
            Ok(())
        }
        Err(e) => {
            // Log the error chain (will respect logging configuration)
            tracing::error!("Application error: {}", e);
            for cause in e.chain().skip(1) {
                tracing::error!("   Caused by: {}", cause);
            }

            logging::log_session_end();
            Err(e)
        }
    }
}
