// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async driver for a relay page: runs the countdown clock, reacts to user
//! commands, dispatches the redirect and applies the fallback policy.
//!
//! The dispatch runs in its own task so the loop keeps serving commands
//! while the exchange is in flight. Teardown stops the clock and any pending
//! fallback timer; an exchange already in flight is left to finish on its
//! own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::credential::AuthState;
use crate::events::{Notice, RelayEvent};
use crate::redirect::countdown::{Countdown, CountdownConfig, Phase, Trigger};
use crate::redirect::dispatcher::{DispatchError, DispatchOutcome, RedirectDispatcher};
use crate::redirect::{Navigation, Navigator, RedirectIntent};

/// User actions on a relay page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    /// Skip the remaining countdown.
    GoNow,
    /// Take the fallback hand-off now instead of waiting for it.
    UseFallback,
    /// Abandon the hand-off and go back to the login page.
    ReturnToLogin,
    DismissNotice,
}

/// How a relay page ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Redirected,
    FellBack { url: Url, manual: bool },
    ReturnedToLogin { url: Url },
    TornDown { phase: Phase },
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub countdown: CountdownConfig,
    /// Delay between a failed exchange and the automatic fallback.
    pub fallback_delay: Duration,
    /// Main app login page, for [`DriverCommand::ReturnToLogin`].
    pub login_url: Url,
}

pub struct RedirectDriver {
    dispatcher: Arc<RedirectDispatcher>,
    navigator: Arc<dyn Navigator>,
    auth: Option<AuthState>,
    countdown: Countdown,
    fallback_delay: Duration,
    login_url: Url,
    events: broadcast::Sender<RelayEvent>,
}

type DispatchResult = Result<DispatchOutcome, DispatchError>;

impl RedirectDriver {
    pub fn new(
        dispatcher: Arc<RedirectDispatcher>,
        navigator: Arc<dyn Navigator>,
        auth: Option<AuthState>,
        config: DriverConfig,
        events: broadcast::Sender<RelayEvent>,
    ) -> Self {
        Self {
            dispatcher,
            navigator,
            auth,
            countdown: Countdown::new(config.countdown),
            fallback_delay: config.fallback_delay,
            login_url: config.login_url,
            events,
        }
    }

    /// Run on a new task. The returned handle sends commands and tears the
    /// driver down.
    pub fn spawn(self, shutdown: CancellationToken) -> DriverHandle {
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(self.run(rx, shutdown.clone()));
        DriverHandle { commands: tx, shutdown, task }
    }

    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<DriverCommand>,
        shutdown: CancellationToken,
    ) -> FlowOutcome {
        let (result_tx, mut results) = mpsc::channel::<DispatchResult>(4);
        let tick = self.countdown.config().tick;
        let mut clock = tokio::time::interval_at(Instant::now() + tick, tick);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut fallback: Option<(RedirectIntent, Instant)> = None;

        let trigger = self.countdown.start();
        self.emit_phase();
        self.emit_progress();
        if let Some(trigger) = trigger {
            self.begin_dispatch(trigger, &result_tx);
        }

        loop {
            let fallback_at = fallback.as_ref().map(|(_, at)| *at);
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!(phase = ?self.countdown.phase(), "relay page torn down");
                    return FlowOutcome::TornDown { phase: self.countdown.phase() };
                }
                _ = clock.tick(), if self.countdown.phase() == Phase::Counting => {
                    let trigger = self.countdown.tick();
                    self.emit_progress();
                    if let Some(trigger) = trigger {
                        self.begin_dispatch(trigger, &result_tx);
                    }
                }
                Some(cmd) = commands.recv() => match cmd {
                    DriverCommand::GoNow => match self.countdown.manual() {
                        Some(trigger) => {
                            self.emit_progress();
                            self.begin_dispatch(trigger, &result_tx);
                        }
                        None => tracing::debug!(phase = ?self.countdown.phase(), "go-now ignored"),
                    },
                    DriverCommand::UseFallback => match fallback.take() {
                        Some((intent, _)) => {
                            return self.fall_back(intent, true).await;
                        }
                        None => tracing::debug!("no fallback available"),
                    },
                    DriverCommand::ReturnToLogin => {
                        if self.countdown.phase() == Phase::Failed {
                            return self.return_to_login().await;
                        }
                        tracing::debug!(phase = ?self.countdown.phase(), "return-to-login ignored");
                    }
                    DriverCommand::DismissNotice => {
                        let _ = self.events.send(RelayEvent::NoticeDismissed);
                    }
                },
                Some(result) = results.recv() => match result {
                    Ok(DispatchOutcome::Redirected) => {
                        self.countdown.finish(true);
                        self.emit_phase();
                        return FlowOutcome::Redirected;
                    }
                    Ok(DispatchOutcome::AlreadyInProgress) => {
                        tracing::debug!("redirect owned by another dispatch");
                    }
                    Err(e) => {
                        self.countdown.finish(false);
                        self.emit_phase();
                        let notice = match e.intent() {
                            Some(intent) => {
                                fallback = Some((intent.clone(), Instant::now() + self.fallback_delay));
                                Notice::exchange_failed(e.to_string())
                            }
                            None => Notice::precondition(e.to_string()),
                        };
                        tracing::warn!(code = %notice.code, err = %e, "redirect failed");
                        let _ = self.events.send(RelayEvent::Notice { notice });
                    }
                },
                _ = sleep_until(fallback_at), if fallback_at.is_some() => {
                    if let Some((intent, _)) = fallback.take() {
                        return self.fall_back(intent, false).await;
                    }
                }
            }
        }
    }

    fn begin_dispatch(&self, trigger: Trigger, results: &mpsc::Sender<DispatchResult>) {
        tracing::info!(?trigger, "dispatching redirect");
        self.emit_phase();
        let dispatcher = Arc::clone(&self.dispatcher);
        let auth = self.auth.clone();
        let results = results.clone();
        tokio::spawn(async move {
            let result = dispatcher.dispatch(auth.as_ref()).await;
            // The driver may be gone; the result is then dropped.
            let _ = results.send(result).await;
        });
    }

    /// Automatic fallbacks open a new browsing context so the notice stays
    /// visible; manual ones replace the page.
    async fn fall_back(&self, intent: RedirectIntent, manual: bool) -> FlowOutcome {
        let url = self.dispatcher.fallback_url(&intent);
        let nav = if manual { Navigation::Assign(url.clone()) } else { Navigation::Open(url.clone()) };
        tracing::info!(manual, "using fallback redirect");
        if let Err(e) = self.navigator.navigate(nav).await {
            tracing::warn!(err = %e, "fallback navigation failed");
        }
        FlowOutcome::FellBack { url, manual }
    }

    async fn return_to_login(&self) -> FlowOutcome {
        let url = self.login_url.clone();
        if let Err(e) = self.navigator.navigate(Navigation::Assign(url.clone())).await {
            tracing::warn!(err = %e, "login navigation failed");
        }
        FlowOutcome::ReturnedToLogin { url }
    }

    fn emit_phase(&self) {
        let _ = self.events.send(RelayEvent::Phase { phase: self.countdown.phase() });
    }

    fn emit_progress(&self) {
        let _ = self.events.send(RelayEvent::Progress {
            progress: self.countdown.progress(),
            remaining_secs: self.countdown.remaining_secs(),
        });
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Handle to a spawned [`RedirectDriver`].
pub struct DriverHandle {
    commands: mpsc::Sender<DriverCommand>,
    shutdown: CancellationToken,
    task: JoinHandle<FlowOutcome>,
}

impl DriverHandle {
    /// Queue a command. Returns false once the driver has finished.
    pub async fn send(&self, cmd: DriverCommand) -> bool {
        self.commands.send(cmd).await.is_ok()
    }

    pub fn commands(&self) -> mpsc::Sender<DriverCommand> {
        self.commands.clone()
    }

    /// Cancel the clock and pending timers.
    pub fn teardown(&self) {
        self.shutdown.cancel();
    }

    pub async fn join(self) -> anyhow::Result<FlowOutcome> {
        Ok(self.task.await?)
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
