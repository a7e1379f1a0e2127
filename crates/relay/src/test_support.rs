// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a scripted backend and a recording navigator.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;

use crate::backend::{
    AuthBackend, BackendError, BoxFuture, DashboardTokenRequest, LoginRequest, LoginSuccess,
};
use crate::credential::token::TokenSource;
use crate::credential::profile::ProfileSource;
use crate::credential::{AuthState, UserProfile};
use crate::redirect::{Navigation, Navigator};

pub const STUB_CALLBACK_URL: &str = "http://backend.test/api/auth/dashboard-callback";

/// Backend that answers from canned results and counts calls.
pub struct StubBackend {
    login: Mutex<Result<LoginSuccess, BackendError>>,
    exchange: Mutex<Result<String, BackendError>>,
    delay: Duration,
    login_calls: AtomicU32,
    exchange_calls: AtomicU32,
    last_exchange: Mutex<Option<(String, DashboardTokenRequest)>>,
}

impl StubBackend {
    /// Backend whose exchange returns `dashboard_token`.
    pub fn issuing(dashboard_token: &str) -> Self {
        Self::with_exchange(Ok(dashboard_token.to_owned()))
    }

    /// Backend whose exchange fails with `status`.
    pub fn refusing(status: u16, message: &str) -> Self {
        Self::with_exchange(Err(BackendError::status(status, message)))
    }

    pub fn with_exchange(exchange: Result<String, BackendError>) -> Self {
        Self {
            login: Mutex::new(Err(BackendError::status(401, "Invalid credentials"))),
            exchange: Mutex::new(exchange),
            delay: Duration::ZERO,
            login_calls: AtomicU32::new(0),
            exchange_calls: AtomicU32::new(0),
            last_exchange: Mutex::new(None),
        }
    }

    /// Delay every exchange by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_login(self, login: Result<LoginSuccess, BackendError>) -> Self {
        *self.login.lock() = login;
        self
    }

    pub fn login_calls(&self) -> u32 {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> u32 {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Bearer token and body of the most recent exchange.
    pub fn last_exchange(&self) -> Option<(String, DashboardTokenRequest)> {
        self.last_exchange.lock().clone()
    }
}

impl AuthBackend for StubBackend {
    fn login<'a>(&'a self, _req: &'a LoginRequest) -> BoxFuture<'a, Result<LoginSuccess, BackendError>> {
        Box::pin(async move {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            self.login.lock().clone()
        })
    }

    fn dashboard_token<'a>(
        &'a self,
        bearer: &'a str,
        req: &'a DashboardTokenRequest,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        Box::pin(async move {
            self.exchange_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_exchange.lock() = Some((bearer.to_owned(), req.clone()));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.exchange.lock().clone()
        })
    }

    fn callback_url(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(STUB_CALLBACK_URL)?)
    }
}

/// Navigator that records every navigation instead of performing it.
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
    fail: AtomicBool,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator whose every navigation errors (after being recorded).
    pub fn failing() -> Self {
        let nav = Self::default();
        nav.fail.store(true, Ordering::SeqCst);
        nav
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, nav: Navigation) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.history.lock().push(nav);
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("navigation blocked");
            }
            Ok(())
        })
    }
}

/// Auth state for a fully resolved test user.
pub fn auth_state(token: &str) -> AuthState {
    AuthState {
        token: token.to_owned(),
        token_source: TokenSource::Durable,
        profile: UserProfile {
            id: "42".to_owned(),
            name: "Jane Doe".to_owned(),
            email: "jane@x.com".to_owned(),
            role: "operator".to_owned(),
        },
        profile_source: ProfileSource::Stored,
    }
}

/// Assert that `$expr` is an `Err` whose message contains `$substr`.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
