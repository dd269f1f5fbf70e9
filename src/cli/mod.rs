//! CLI module for quovo-tour
//!
//! clap-based command surface: the interactive API walkthrough plus a
//! version command, with global data-dir and verbosity flags.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};

use commands::version::{VersionArgs, VersionCommand};
use commands::walkthrough::{WalkthroughArgs, WalkthroughCommand};

#[derive(Parser)]
#[command(name = "quovo-tour")]
#[command(version)]
#[command(about = "Interactive walkthrough of the Quovo v2 aggregation API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path for session logs (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Verbose logging (also mirrors the session log to the console)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the guided API walkthrough
    Walkthrough(WalkthroughArgs),

    /// Show version information
    Version(VersionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);
        data_paths.ensure_directories()?;

        match self.command {
            Commands::Walkthrough(args) => {
                WalkthroughCommand::new(args)
                    .execute(data_paths, self.verbose > 0)
                    .await
            }
            Commands::Version(args) => VersionCommand::new(args).execute().await,
        }
    }
}
