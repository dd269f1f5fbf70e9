//! The guided walkthrough: validate credentials, mint a token, create a
//! User and an Account, sync it, then browse its financial data.

pub mod input;
pub mod retry;
pub mod sync;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::types::{
    AccountBody, PortfoliosBody, PositionsBody, SyncBody, SyncRecord, SyncStatus, TokenBody,
    UserBody,
};
use crate::api::{ApiError, Envelope, QuovoClient};
use crate::config::ApiConfig;
use crate::view::View;
use input::InputSource;
use sync::{PollStep, SyncPoller};

/// Drives the linear walkthrough. Creation steps retry until they
/// succeed; sync and data fetches are best-effort.
pub struct Walkthrough<I> {
    client: QuovoClient,
    view: View,
    input: I,
    config: ApiConfig,
}

impl<I: InputSource> Walkthrough<I> {
    pub fn new(config: ApiConfig, view: View, input: I) -> Result<Self> {
        let client = QuovoClient::new(&config).context("failed to build HTTP client")?;
        Ok(Self {
            client,
            view,
            input,
            config,
        })
    }

    /// Runs the whole guided flow to completion.
    pub async fn run(&mut self) -> Result<()> {
        let (username, password) =
            retry::until_some(self, |flow| Box::pin(flow.try_check_credentials())).await?;

        let token = retry::until_some(self, |flow| {
            let username = username.clone();
            let password = password.clone();
            Box::pin(async move { flow.try_create_token(&username, &password).await })
        })
        .await?;
        // Every call from here on authenticates with the new token.
        self.client = self.client.with_token(token);

        let user_id = retry::until_some(self, |flow| Box::pin(flow.try_create_user())).await?;
        let account_id =
            retry::until_some(self, move |flow| Box::pin(flow.try_create_account(user_id)))
                .await?;

        if !self.start_sync(account_id).await? {
            return Ok(());
        }
        match self.watch_sync(account_id).await? {
            Some(SyncStatus::Good) => {}
            _ => return Ok(()),
        }
        let Some(portfolio_id) = self.account_portfolio(account_id).await? else {
            return Ok(());
        };
        self.account_menu(portfolio_id).await
    }

    /// Step 1: validate the API user credentials (Basic auth).
    async fn try_check_credentials(&mut self) -> Result<Option<(String, String)>> {
        self.view.welcome();
        let username = self.input.read_line("Username: ")?;
        let password = self.input.read_password("Password: ")?;
        match self.client.check_credentials(&username, &password).await {
            Ok(envelope) => {
                info!(username = %username, "API credentials verified");
                self.view.confirm_credentials();
                self.view.print_envelope(&envelope);
                self.pause()?;
                Ok(Some((username, password)))
            }
            Err(err) => {
                self.step_failed(&err)?;
                Ok(None)
            }
        }
    }

    /// Step 2: mint the Access Token used for all subsequent requests.
    async fn try_create_token(&mut self, username: &str, password: &str) -> Result<Option<String>> {
        self.view.token_intro();
        let name = self.input.read_line("Let's name this new Token: ")?;
        let outcome = self
            .client
            .create_token(username, password, &name)
            .await
            .and_then(|envelope| {
                let body: TokenBody = envelope.decode()?;
                Ok((envelope, body))
            });
        match outcome {
            Ok((envelope, body)) => {
                info!(token_name = %name, "access token created");
                self.view.confirm_token();
                self.view.print_envelope(&envelope);
                self.pause()?;
                Ok(Some(body.access_token.token))
            }
            Err(err) => {
                self.step_failed(&err)?;
                Ok(None)
            }
        }
    }

    /// Step 3: create the User that will own the demo Account.
    async fn try_create_user(&mut self) -> Result<Option<u64>> {
        self.view.user_intro();
        let username = self.input.read_line("Enter the new User's username: ")?;
        let outcome = self.client.create_user(&username).await.and_then(|envelope| {
            let body: UserBody = envelope.decode()?;
            Ok((envelope, body))
        });
        match outcome {
            Ok((envelope, body)) => {
                info!(user_id = body.user.id, "user created");
                self.view.confirm_user();
                self.view.print_envelope(&envelope);
                self.pause()?;
                Ok(Some(body.user.id))
            }
            Err(err) => {
                self.step_failed(&err)?;
                Ok(None)
            }
        }
    }

    /// Step 4: create an Account against the test brokerage. A retry
    /// keeps the already-created user id.
    async fn try_create_account(&mut self, user_id: u64) -> Result<Option<u64>> {
        self.view.account_intro();
        let username = self.input.read_line("Username: ")?;
        let password = self.input.read_line("Password: ")?;
        let outcome = self
            .client
            .create_account(user_id, self.config.brokerage_id, &username, &password)
            .await
            .and_then(|envelope| {
                let body: AccountBody = envelope.decode()?;
                Ok((envelope, body))
            });
        match outcome {
            Ok((envelope, body)) => {
                info!(account_id = body.account.id, "account created");
                self.view.confirm_account();
                self.view.print_envelope(&envelope);
                self.pause()?;
                Ok(Some(body.account.id))
            }
            Err(err) => {
                self.step_failed(&err)?;
                Ok(None)
            }
        }
    }

    /// Best-effort sync trigger; a failure halts the walkthrough.
    async fn start_sync(&mut self, account_id: u64) -> Result<bool> {
        self.view.sync_intro();
        self.pause()?;
        match self.client.sync_account(account_id).await {
            Ok(envelope) => {
                info!(account_id, "sync initiated");
                self.view.print_envelope(&envelope);
                Ok(true)
            }
            Err(err) => {
                warn!(account_id, error = %err, "sync initiation failed");
                self.show_api_error(&err);
                Ok(false)
            }
        }
    }

    /// Watches the sync until it settles. Returns the terminal status,
    /// or None when the very first status fetch fails.
    async fn watch_sync(&mut self, account_id: u64) -> Result<Option<SyncStatus>> {
        self.view.sync_status_header();
        let mut poller = SyncPoller::new(self.config.poll.clone());
        let bar = self.view.sync_progress_bar();
        loop {
            let observed = self.fetch_sync(account_id).await;
            match poller.step(observed.as_ref().map(|(_, sync)| sync)) {
                PollStep::Wait(delay) => {
                    match &observed {
                        Ok((_, sync)) => self.view.update_sync_progress(&bar, sync),
                        Err(err) => {
                            warn!(account_id, error = %err, "sync status poll failed");
                            bar.suspend(|| self.view.show_error(err));
                        }
                    }
                    tokio::time::sleep(delay).await;
                }
                PollStep::Settled(status) => {
                    bar.finish_and_clear();
                    info!(account_id, status = %status, "sync settled");
                    self.view.account_status(&status);
                    if status == SyncStatus::Good {
                        if let Ok((envelope, _)) = &observed {
                            self.view.print_envelope(envelope);
                        }
                        self.pause()?;
                    } else {
                        self.view.bad_sync();
                    }
                    return Ok(Some(status));
                }
                PollStep::Abort => {
                    bar.finish_and_clear();
                    if let Err(err) = &observed {
                        warn!(account_id, error = %err, "sync status unavailable");
                        self.show_api_error(err);
                    }
                    self.pause()?;
                    return Ok(None);
                }
            }
        }
    }

    async fn fetch_sync(&self, account_id: u64) -> Result<(Envelope, SyncRecord), ApiError> {
        let envelope = self.client.sync_status(account_id).await?;
        let body: SyncBody = envelope.decode()?;
        Ok((envelope, body.sync))
    }

    /// Fetches the Account's single demo Portfolio id (best-effort).
    async fn account_portfolio(&mut self, account_id: u64) -> Result<Option<u64>> {
        let outcome = self
            .client
            .account_portfolios(account_id)
            .await
            .and_then(|envelope| {
                let body: PortfoliosBody = envelope.decode()?;
                Ok(body)
            });
        match outcome {
            // The demo account carries exactly one portfolio.
            Ok(body) => match body.portfolios.first() {
                Some(portfolio) => Ok(Some(portfolio.id)),
                None => {
                    self.view.no_portfolios();
                    Ok(None)
                }
            },
            Err(err) => {
                self.show_api_error(&err);
                Ok(None)
            }
        }
    }

    /// The post-sync account menu: repeat until exit.
    async fn account_menu(&mut self, portfolio_id: u64) -> Result<()> {
        loop {
            self.view.menu();
            let choice = self.input.read_line("Select an option: ")?;
            match choice.as_str() {
                "1" => self.show_portfolio(portfolio_id).await?,
                "2" => self.show_positions(portfolio_id).await?,
                "3" => self.show_history(portfolio_id).await?,
                "4" => break,
                _ => {}
            }
        }
        self.view.exit();
        Ok(())
    }

    /// Menu option 1: portfolio detail.
    async fn show_portfolio(&mut self, portfolio_id: u64) -> Result<()> {
        self.view.portfolio_header();
        match self.client.portfolio(portfolio_id).await {
            Ok(envelope) => self.view.print_envelope(&envelope),
            Err(err) => self.show_api_error(&err),
        }
        self.pause_menu()
    }

    /// Menu option 2: positions, plus an equity summary table.
    async fn show_positions(&mut self, portfolio_id: u64) -> Result<()> {
        self.view.positions_header();
        match self.client.portfolio_positions(portfolio_id).await {
            Ok(envelope) => {
                self.view.print_envelope(&envelope);
                match envelope.decode::<PositionsBody>() {
                    Ok(body) => self.view.equity_summary(&body.positions),
                    // The raw envelope was already shown; the summary is extra.
                    Err(err) => warn!(error = %err, "positions body did not decode"),
                }
            }
            Err(err) => self.show_api_error(&err),
        }
        self.pause_menu()
    }

    /// Menu option 3: transaction history.
    async fn show_history(&mut self, portfolio_id: u64) -> Result<()> {
        self.view.history_header();
        match self.client.portfolio_history(portfolio_id).await {
            Ok(envelope) => self.view.print_envelope(&envelope),
            Err(err) => self.show_api_error(&err),
        }
        self.pause_menu()
    }

    /// Shows an API failure and the failed exchange, when the server
    /// answered.
    fn show_api_error(&self, err: &ApiError) {
        self.view.show_error(err);
        if let Some(envelope) = err.envelope() {
            self.view.print_envelope(envelope);
        }
    }

    /// Failure display for retrying steps: show it, then pause so the
    /// user can read before the re-prompt.
    fn step_failed(&mut self, err: &ApiError) -> Result<()> {
        warn!(error = %err, "walkthrough step failed");
        self.show_api_error(err);
        self.pause()
    }

    fn pause(&mut self) -> Result<()> {
        self.input.read_line("\nPress enter to continue...")?;
        Ok(())
    }

    fn pause_menu(&mut self) -> Result<()> {
        self.input
            .read_line("\nPress enter to go back to the Account menu.")?;
        Ok(())
    }
}
