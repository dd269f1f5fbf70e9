//! Terminal presentation for the walkthrough. Output only; all input
//! goes through the walkthrough's `InputSource`.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde_json::Value;

use crate::api::types::{Position, SyncRecord, SyncStatus};
use crate::api::{ApiError, Envelope};

const DELIMITER_WIDTH: usize = 60;

/// All user-facing terminal output for the walkthrough.
#[derive(Debug, Default)]
pub struct View;

impl View {
    pub fn new() -> Self {
        Self
    }

    fn delimiter(&self) {
        println!("{}", "─".repeat(DELIMITER_WIDTH).bright_black());
    }

    pub fn welcome(&self) {
        println!(
            "\n{}",
            "Welcome to the interactive Quovo API walkthrough!"
                .bright_blue()
                .bold()
        );
        println!(
            "\nThis program connects directly to the Quovo API and walks through how to:

  - Create an API Access Token with your Quovo API credentials.
  - Create a Quovo User.
  - Create and sync an Account on an available Test Brokerage.
  - Retrieve Portfolios associated with the newly created Account.
  - Retrieve Positions and History for these Portfolios.

Let's begin by validating your API user credentials.
"
        );
    }

    pub fn confirm_credentials(&self) {
        println!(
            "\n{} Your API user credentials look good.\n",
            "✅".bright_green()
        );
    }

    pub fn token_intro(&self) {
        println!(
            "\nNext, we will need to create an API Access Token.

This token will authenticate our API user during all subsequent requests.
"
        );
    }

    pub fn confirm_token(&self) {
        println!(
            "\n{} We have a new Access Token, so future requests can authenticate themselves.\n",
            "✅".bright_green()
        );
    }

    pub fn user_intro(&self) {
        println!(
            "\nNow that we have our Token, let's actually do something with it.

First, we are going to make a Quovo User. This User will own any Accounts
we create, and its username will usually be related to a username within
your own system.
"
        );
    }

    pub fn confirm_user(&self) {
        println!(
            "\n{} We now have a new Quovo User to sync Accounts onto.\n",
            "✅".bright_green()
        );
    }

    pub fn account_intro(&self) {
        println!(
            "\nNext, we are going to create an Account for the new User.

A Quovo Account is equivalent to a login at a financial institution. For
this demo, the Account goes on a Quovo Test Brokerage instead of a live
institution, so the credentials below do not matter.
"
        );
    }

    pub fn confirm_account(&self) {
        println!("\n{} The account was added successfully!\n", "✅".bright_green());
    }

    pub fn sync_intro(&self) {
        println!(
            "\nNow, we will initiate a sync on the Account we just created.

Syncs represent ongoing updates on a given Account. After creating an
Account, you always need to trigger a sync to begin fetching the relevant
financial data.
"
        );
    }

    pub fn sync_status_header(&self) {
        self.delimiter();
        println!(
            "We have successfully initiated a sync on the Account.

Let's check the ongoing sync progress...
"
        );
    }

    /// Progress bar for the sync watch, in percent.
    pub fn sync_progress_bar(&self) -> ProgressBar {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        bar
    }

    pub fn update_sync_progress(&self, bar: &ProgressBar, sync: &SyncRecord) {
        if let Some(progress) = &sync.progress {
            if let Some(percent) = progress.percent {
                bar.set_position((percent * 100.0).round() as u64);
            }
            if let Some(message) = &progress.message {
                bar.set_message(message.clone());
            }
        }
        bar.tick();
    }

    pub fn account_status(&self, status: &SyncStatus) {
        println!("\n{}", "All done!".bright_green().bold());
        println!(
            "\nThe final sync status on the Account: {}",
            status.to_string().bright_yellow()
        );
        self.delimiter();
    }

    pub fn bad_sync(&self) {
        println!(
            "{} Looks like there was an issue while syncing the account.",
            "❌".bright_red()
        );
    }

    pub fn no_portfolios(&self) {
        println!(
            "\n{} The synced Account returned no portfolios.",
            "❌".bright_red()
        );
    }

    pub fn menu(&self) {
        println!(
            "\nNow that the Account is synced, we can check out its financial data.

Enter one of the following options:
"
        );
        println!("  {} - Portfolio", "1".bright_cyan());
        println!("  {} - Positions", "2".bright_cyan());
        println!("  {} - History", "3".bright_cyan());
        println!("  {} - Exit", "4".bright_cyan());
        println!();
    }

    pub fn portfolio_header(&self) {
        println!(
            "\nHere is the Account's Portfolio.

A Portfolio represents subaccounts found within an institution login.
Positions and History belong to a single Portfolio, not an Account.
"
        );
    }

    pub fn positions_header(&self) {
        println!("\nHere are the Positions or holdings within the Account's Portfolio.\n");
    }

    pub fn history_header(&self) {
        println!("\nHere are the historical transactions within the Account's Portfolio.\n");
    }

    pub fn exit(&self) {
        println!("\nGoodbye.\n");
    }

    pub fn show_error(&self, err: &ApiError) {
        println!(
            "\n{} {}",
            "❌".bright_red(),
            err.to_string().bright_red()
        );
    }

    /// Pretty-prints a completed exchange: request line, headers, body,
    /// and the full JSON response.
    pub fn print_envelope(&self, envelope: &Envelope) {
        self.delimiter();
        println!("{}", "Request:".bright_yellow());
        println!(
            "{} {}",
            envelope.request.method.bright_cyan(),
            envelope.request.url
        );
        if !envelope.request.headers.is_empty() {
            println!("\n{}", "Request Headers:".bright_yellow());
            for (name, value) in &envelope.request.headers {
                println!("{name}: {value}");
            }
        }
        if let Some(body) = &envelope.request.body {
            println!("\n{}", "Request Params:".bright_yellow());
            println!("{}", pretty(body));
        }
        println!("\n{}", "Response:".bright_yellow());
        println!("{}", pretty(&envelope.response));
    }

    /// Renders the equity holdings in a Portfolio as a table.
    pub fn equity_summary(&self, positions: &[Position]) {
        let equities: Vec<&Position> = positions.iter().filter(|p| p.is_equity()).collect();
        if equities.is_empty() {
            return;
        }
        match equities[0].portfolio_name.as_deref() {
            Some(name) => println!(
                "\n{} {}",
                "Equity holdings in".bright_yellow(),
                name.bright_yellow().bold()
            ),
            None => println!("\n{}", "Equity holdings".bright_yellow()),
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Ticker", "Quantity", "Price"]);
        for position in &equities {
            table.add_row(vec![
                position.ticker.clone().unwrap_or_default(),
                position
                    .quantity
                    .map(|quantity| quantity.to_string())
                    .unwrap_or_default(),
                position
                    .price
                    .map(|price| format!("${price:.2}"))
                    .unwrap_or_default(),
            ]);
        }
        println!("{table}");
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
