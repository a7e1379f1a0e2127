// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(args)
}

#[test]
fn development_defaults() -> anyhow::Result<()> {
    let cli = parse(&["stms-relay", "status"]);
    let config = &cli.config;
    config.validate()?;
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.api_url()?.as_str(), "http://localhost:5500/");
    assert_eq!(config.main_app_url()?.as_str(), "http://localhost:3000/");
    assert_eq!(config.dashboard_url()?.as_str(), "http://localhost:3001/");
    assert_eq!(config.login_url()?.as_str(), "http://localhost:3000/login");
    assert!(matches!(cli.command, Command::Status));
    Ok(())
}

#[test]
fn production_dashboard_follows_main_app() -> anyhow::Result<()> {
    let cli = parse(&["stms-relay", "--env", "production", "handoff"]);
    let config = &cli.config;
    assert_eq!(config.api_url()?.as_str(), format!("{PROD_API_URL}/"));
    assert_eq!(config.dashboard_url()?.as_str(), format!("{PROD_MAIN_APP_URL}/dashboard"));

    let cli = parse(&[
        "stms-relay",
        "--env",
        "production",
        "--main-app-url",
        "https://stms.example",
        "handoff",
    ]);
    assert_eq!(cli.config.dashboard_url()?.as_str(), "https://stms.example/dashboard");
    Ok(())
}

#[test]
fn explicit_urls_override_environment() -> anyhow::Result<()> {
    let cli = parse(&[
        "stms-relay",
        "--env",
        "production",
        "--api-url",
        "http://127.0.0.1:9000",
        "--dashboard-url",
        "http://127.0.0.1:9001/app",
        "status",
    ]);
    assert_eq!(cli.config.api_url()?.as_str(), "http://127.0.0.1:9000/");
    assert_eq!(cli.config.dashboard_url()?.as_str(), "http://127.0.0.1:9001/app");
    Ok(())
}

#[test]
fn timing_knobs_feed_driver_config() -> anyhow::Result<()> {
    let cli = parse(&[
        "stms-relay",
        "--countdown-secs",
        "3",
        "--tick-ms",
        "250",
        "--progress-step",
        "10",
        "--fallback-delay-ms",
        "500",
        "handoff",
        "--now",
    ]);
    let driver = cli.config.driver_config()?;
    assert_eq!(driver.countdown.duration_secs, 3);
    assert_eq!(driver.countdown.tick, Duration::from_millis(250));
    assert_eq!(driver.countdown.progress_step, 10);
    assert_eq!(driver.countdown.tick_ms(), 250);
    assert_eq!(driver.fallback_delay, Duration::from_millis(500));
    assert!(matches!(cli.command, Command::Handoff { now: true }));
    Ok(())
}

#[test]
fn default_timing_matches_relay_page() {
    let cli = parse(&["stms-relay", "status"]);
    assert_eq!(cli.config.countdown_config(), CountdownConfig::default());
    assert_eq!(cli.config.fallback_delay(), Duration::from_secs(2));
    assert_eq!(cli.config.login_redirect_delay(), Duration::from_millis(1500));
    assert_eq!(cli.config.http_timeout(), Duration::from_secs(30));
}

#[test]
fn receive_takes_positional_url() {
    let cli = parse(&["stms-relay", "receive", "http://localhost:3001/?token=t"]);
    match cli.command {
        Command::Receive { url } => assert_eq!(url, "http://localhost:3001/?token=t"),
        other => unreachable!("unexpected command: {other:?}"),
    }
}

#[yare::parameterized(
    bad_api_url     = { &["stms-relay", "--api-url", "not a url", "status"], "invalid api url" },
    ftp_dashboard   = { &["stms-relay", "--dashboard-url", "ftp://x", "status"], "expected http or https" },
    zero_tick       = { &["stms-relay", "--tick-ms", "0", "status"], "--tick-ms" },
    zero_step       = { &["stms-relay", "--progress-step", "0", "status"], "--progress-step" },
    zero_timeout    = { &["stms-relay", "--http-timeout-secs", "0", "status"], "--http-timeout-secs" },
    bad_log_format  = { &["stms-relay", "--log-format", "xml", "status"], "log format" },
)]
fn invalid_config(args: &[&str], expected_substr: &str) {
    let cli = parse(args);
    crate::assert_err_contains!(cli.config.validate(), expected_substr);
}

#[test]
fn state_dir_flag_wins() {
    let cli = parse(&["stms-relay", "--state-dir", "/tmp/relay-state", "status"]);
    assert_eq!(cli.config.state_dir(), std::path::PathBuf::from("/tmp/relay-state"));
}
