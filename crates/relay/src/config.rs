// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

use crate::redirect::countdown::CountdownConfig;
use crate::redirect::driver::DriverConfig;

pub const DEV_API_URL: &str = "http://localhost:5500";
pub const DEV_MAIN_APP_URL: &str = "http://localhost:3000";
pub const DEV_DASHBOARD_URL: &str = "http://localhost:3001";
pub const PROD_API_URL: &str = "https://smart-traffic-management-system-23fs.onrender.com";
pub const PROD_MAIN_APP_URL: &str = "https://smart-traffic-management-system-black-kappa.vercel.app";
/// Production dashboard path on the main app origin.
pub const PROD_DASHBOARD_PATH: &str = "/dashboard";

/// Deployment the default endpoints are picked from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Cross-application authentication relay for STMS.
#[derive(Debug, Parser)]
#[command(name = "stms-relay", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: RelayConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in against the auth backend and store the session.
    Login {
        #[arg(long, env = "STMS_RELAY_EMAIL")]
        email: String,
        #[arg(long, env = "STMS_RELAY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Run the main-app relay page: count down, then hand off to the dashboard.
    Handoff {
        /// Skip the countdown.
        #[arg(long)]
        now: bool,
    },
    /// Bootstrap the dashboard side from an inbound URL.
    Receive {
        /// Full URL the dashboard was opened with.
        url: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show the stored session.
    Status,
}

/// Endpoints, timing and logging for the relay.
#[derive(Debug, Clone, clap::Args)]
pub struct RelayConfig {
    /// Deployment whose default endpoints to use.
    #[arg(long = "env", value_enum, default_value_t, env = "STMS_RELAY_ENV")]
    pub environment: Environment,

    /// Auth backend base URL.
    #[arg(long, env = "STMS_RELAY_API_URL")]
    pub api_url: Option<String>,

    /// Main app origin (login, logout and relay pages).
    #[arg(long, env = "STMS_RELAY_MAIN_APP_URL")]
    pub main_app_url: Option<String>,

    /// Dashboard URL the hand-off targets.
    #[arg(long, env = "STMS_RELAY_DASHBOARD_URL")]
    pub dashboard_url: Option<String>,

    /// Directory holding the persisted credential scopes.
    #[arg(long, env = "STMS_RELAY_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// User agent reported to the backend.
    #[arg(long, env = "STMS_RELAY_USER_AGENT", default_value = concat!("stms-relay/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Seconds before the automatic hand-off.
    #[arg(long, env = "STMS_RELAY_COUNTDOWN_SECS", default_value_t = 5)]
    pub countdown_secs: u32,

    /// Countdown clock period in milliseconds.
    #[arg(long, env = "STMS_RELAY_TICK_MS", default_value_t = 100)]
    pub tick_ms: u64,

    /// Progress added per clock tick, out of 100.
    #[arg(long, env = "STMS_RELAY_PROGRESS_STEP", default_value_t = 4)]
    pub progress_step: u8,

    /// Delay before the automatic fallback after a failed exchange.
    #[arg(long, env = "STMS_RELAY_FALLBACK_DELAY_MS", default_value_t = 2000)]
    pub fallback_delay_ms: u64,

    /// Delay before an unauthenticated dashboard returns to login.
    #[arg(long, env = "STMS_RELAY_LOGIN_REDIRECT_DELAY_MS", default_value_t = 1500)]
    pub login_redirect_delay_ms: u64,

    #[arg(long, env = "STMS_RELAY_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Log format (json or text).
    #[arg(long, env = "STMS_RELAY_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "STMS_RELAY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl RelayConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api_url()?;
        self.main_app_url()?;
        self.dashboard_url()?;

        if self.tick_ms == 0 {
            anyhow::bail!("--tick-ms must be greater than zero");
        }
        if self.progress_step == 0 {
            anyhow::bail!("--progress-step must be greater than zero");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("--http-timeout-secs must be greater than zero");
        }
        if !matches!(self.log_format.as_str(), "json" | "text") {
            anyhow::bail!("invalid log format: {}", self.log_format);
        }
        Ok(())
    }

    pub fn api_url(&self) -> anyhow::Result<Url> {
        let default = match self.environment {
            Environment::Development => DEV_API_URL,
            Environment::Production => PROD_API_URL,
        };
        parse_url("api", self.api_url.as_deref().unwrap_or(default))
    }

    pub fn main_app_url(&self) -> anyhow::Result<Url> {
        let default = match self.environment {
            Environment::Development => DEV_MAIN_APP_URL,
            Environment::Production => PROD_MAIN_APP_URL,
        };
        parse_url("main app", self.main_app_url.as_deref().unwrap_or(default))
    }

    pub fn dashboard_url(&self) -> anyhow::Result<Url> {
        if let Some(ref url) = self.dashboard_url {
            return parse_url("dashboard", url);
        }
        match self.environment {
            Environment::Development => parse_url("dashboard", DEV_DASHBOARD_URL),
            Environment::Production => Ok(self.main_app_url()?.join(PROD_DASHBOARD_PATH)?),
        }
    }

    /// Login page on the main app.
    pub fn login_url(&self) -> anyhow::Result<Url> {
        Ok(self.main_app_url()?.join(crate::session::LOGIN_PAGE_PATH)?)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(crate::credential::state_dir)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn countdown_config(&self) -> CountdownConfig {
        CountdownConfig {
            duration_secs: self.countdown_secs,
            tick: self.tick(),
            progress_step: self.progress_step,
        }
    }

    pub fn driver_config(&self) -> anyhow::Result<DriverConfig> {
        Ok(DriverConfig {
            countdown: self.countdown_config(),
            fallback_delay: self.fallback_delay(),
            login_url: self.login_url()?,
        })
    }
}

fn parse_url(what: &str, raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).map_err(|e| anyhow::anyhow!("invalid {what} url {raw:?}: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("invalid {what} url {raw:?}: expected http or https");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
