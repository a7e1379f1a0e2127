// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! STMS relay: carries an authenticated session from the main app to the
//! dashboard app.

pub mod backend;
pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod location;
pub mod redirect;
pub mod session;
pub mod state;
pub mod test_support;

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backend::client::BackendClient;
use crate::config::{Cli, Command, RelayConfig};
use crate::credential::store::CredentialStore;
use crate::events::{NoticeAction, RelayEvent};
use crate::location::PageLocation;
use crate::redirect::dispatcher::RedirectDispatcher;
use crate::redirect::driver::{DriverCommand, FlowOutcome, RedirectDriver};
use crate::redirect::navigator::HttpNavigator;

/// Run one CLI command to completion.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config;
    let dir = config.state_dir();
    let store = state::open_store(&dir);
    tracing::debug!(state_dir = %dir.display(), "credential store opened");

    match cli.command {
        Command::Login { email, password } => {
            let backend = BackendClient::new(config.api_url()?, &config.user_agent, config.http_timeout());
            let auth = session::login(&backend, &store, &email, &password).await?;
            println!("logged in as {} <{}>", auth.profile.name, auth.profile.email);
        }
        Command::Handoff { now } => {
            let outcome = handoff(&config, store, now).await?;
            print_outcome(&outcome);
        }
        Command::Receive { url } => receive(&config, &store, &url).await?,
        Command::Logout => {
            let navigator = navigator(&config);
            let url = session::logout(&store, &navigator, &config.main_app_url()?).await?;
            println!("{url}");
        }
        Command::Status => {
            let status = match session::current(&store) {
                Ok(auth) => serde_json::json!({
                    "authenticated": true,
                    "token_source": auth.token_source,
                    "profile_source": auth.profile_source,
                    "user": auth.profile,
                }),
                Err(e) => serde_json::json!({ "authenticated": false, "error": e }),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}

fn navigator(config: &RelayConfig) -> HttpNavigator {
    HttpNavigator::new(&config.user_agent, config.http_timeout())
}

/// Main-app relay page: count down (or go now), then hand off.
async fn handoff(config: &RelayConfig, store: CredentialStore, now: bool) -> anyhow::Result<FlowOutcome> {
    let auth = match session::current(&store) {
        Ok(auth) => Some(auth),
        Err(e) => {
            warn!(err = %e, "no stored session");
            None
        }
    };

    let backend = Arc::new(BackendClient::new(config.api_url()?, &config.user_agent, config.http_timeout()));
    let navigator = Arc::new(navigator(config));
    let dispatcher = Arc::new(RedirectDispatcher::new(
        backend,
        Arc::clone(&navigator) as _,
        config.dashboard_url()?,
        config.user_agent.clone(),
    ));

    let (events, rx) = events::channel();
    let driver =
        RedirectDriver::new(dispatcher, Arc::clone(&navigator) as _, auth, config.driver_config()?, events);
    let shutdown = CancellationToken::new();
    let handle = driver.spawn(shutdown.clone());
    tokio::spawn(watch_events(rx, handle.commands()));

    if now {
        handle.send(DriverCommand::GoNow).await;
    }

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let outcome = handle.join().await?;
    if let Some(url) = navigator.last_landed() {
        info!(url = %url.origin().ascii_serialization(), "landed");
    }
    Ok(outcome)
}

/// Log driver events. A headless page has nobody to click "return to login",
/// so that action is taken as soon as it is offered.
async fn watch_events(
    mut rx: broadcast::Receiver<RelayEvent>,
    commands: tokio::sync::mpsc::Sender<DriverCommand>,
) {
    loop {
        match rx.recv().await {
            Ok(RelayEvent::Progress { progress, remaining_secs }) => {
                tracing::debug!(progress, remaining_secs, "progress");
            }
            Ok(RelayEvent::Phase { phase }) => info!(?phase, "phase"),
            Ok(RelayEvent::Notice { notice }) => {
                warn!(code = %notice.code, "{}", notice.message);
                if notice.action == NoticeAction::ReturnToLogin {
                    let _ = commands.send(DriverCommand::ReturnToLogin).await;
                }
            }
            Ok(RelayEvent::NoticeDismissed) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

/// Dashboard side: bootstrap from the inbound URL, or bounce to login.
async fn receive(config: &RelayConfig, store: &CredentialStore, url: &str) -> anyhow::Result<()> {
    let mut location = PageLocation::parse(url)?;
    match session::bootstrap(&mut location, store) {
        Ok(auth) => {
            println!("{}", location.as_str());
            println!("signed in as {} <{}> ({})", auth.profile.name, auth.profile.email, auth.profile.role);
        }
        Err(e) => {
            warn!(err = %e, "dashboard has no session");
            let navigator = navigator(config);
            let url =
                session::redirect_to_login(&navigator, &config.main_app_url()?, config.login_redirect_delay())
                    .await?;
            println!("{url}");
        }
    }
    Ok(())
}

fn print_outcome(outcome: &FlowOutcome) {
    match outcome {
        FlowOutcome::Redirected => println!("redirected to dashboard"),
        FlowOutcome::FellBack { url, manual } => {
            let how = if *manual { "manual" } else { "automatic" };
            println!("{how} fallback: {url}");
        }
        FlowOutcome::ReturnedToLogin { url } => println!("returned to login: {url}"),
        FlowOutcome::TornDown { phase } => println!("cancelled ({phase:?})"),
    }
}
