use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use url::Url;

use crate::config::ApiConfig;
use crate::data_paths::DataPaths;
use crate::logging::{self, LogMode, LoggingConfig};
use crate::view::View;
use crate::walkthrough::input::StdinInput;
use crate::walkthrough::Walkthrough;

#[derive(Args)]
pub struct WalkthroughArgs {
    /// Override the API base URL (e.g. a sandbox deployment)
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Override the brokerage id used for the demo Account
    #[arg(long)]
    pub brokerage_id: Option<u64>,
}

pub struct WalkthroughCommand {
    args: WalkthroughArgs,
}

impl WalkthroughCommand {
    pub fn new(args: WalkthroughArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths, verbose: bool) -> Result<()> {
        // File-only logging keeps the interactive terminal clean.
        let mode = if verbose {
            LogMode::ConsoleAndFile
        } else {
            LogMode::FileOnly
        };
        logging::init_logging(LoggingConfig::new(mode, data_paths))?;

        let mut config = ApiConfig::from_env().context("invalid environment configuration")?;
        if let Some(base_url) = &self.args.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(brokerage_id) = self.args.brokerage_id {
            config.brokerage_id = brokerage_id;
        }
        info!(base_url = %config.base_url, "starting walkthrough");

        let mut flow = Walkthrough::new(config, View::new(), StdinInput)?;
        flow.run().await
    }
}
