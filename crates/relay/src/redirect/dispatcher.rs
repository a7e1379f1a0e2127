// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redirect dispatcher: one secure hand-off attempt per call, guarded against
//! concurrent duplicates.
//!
//! The dispatcher never falls back on its own. A failed attempt returns the
//! [`RedirectIntent`] inside the error so the caller can build the fallback
//! URL and decide when to use it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use url::Url;

use crate::backend::{AuthBackend, BackendError, DashboardTokenRequest};
use crate::credential::AuthState;
use crate::error::{ErrorCode, RelayError};
use crate::redirect::{Navigation, Navigator, RedirectIntent};
use crate::state::epoch_ms;

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The secure form was submitted; the page is navigating away.
    Redirected,
    /// Another dispatch is already in flight. Nothing was sent.
    AlreadyInProgress,
}

#[derive(Debug, Clone)]
pub enum DispatchError {
    /// Token or profile missing. Nothing was sent.
    Precondition(String),
    /// The dashboard token exchange failed.
    Exchange { intent: RedirectIntent, error: BackendError },
    /// The exchange succeeded but the callback form could not be submitted.
    Navigation { intent: RedirectIntent, message: String },
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Precondition(_) => ErrorCode::Precondition,
            Self::Exchange { .. } | Self::Navigation { .. } => ErrorCode::ExchangeFailed,
        }
    }

    /// Intent to fall back with. `None` when the failure happened before an
    /// intent could be built.
    pub fn intent(&self) -> Option<&RedirectIntent> {
        match self {
            Self::Precondition(_) => None,
            Self::Exchange { intent, .. } | Self::Navigation { intent, .. } => Some(intent),
        }
    }

    pub fn to_relay_error(&self) -> RelayError {
        self.code().to_error(self.to_string())
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition(msg) => f.write_str(msg),
            Self::Exchange { error, .. } => write!(f, "secure redirect failed: {error}"),
            Self::Navigation { message, .. } => write!(f, "secure redirect failed: {message}"),
        }
    }
}

impl std::error::Error for DispatchError {}

pub struct RedirectDispatcher {
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    dashboard_url: Url,
    user_agent: String,
    in_progress: AtomicBool,
}

impl RedirectDispatcher {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
        dashboard_url: Url,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            navigator,
            dashboard_url,
            user_agent: user_agent.into(),
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn dashboard_url(&self) -> &Url {
        &self.dashboard_url
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Build the intent for the given auth state, checking preconditions.
    pub fn intent(&self, auth: Option<&AuthState>) -> Result<RedirectIntent, DispatchError> {
        let auth = auth.ok_or_else(|| {
            DispatchError::Precondition("no authenticated user; please log in again".to_owned())
        })?;
        if auth.token.is_empty() {
            return Err(DispatchError::Precondition(
                "no authentication token; please log in again".to_owned(),
            ));
        }
        Ok(RedirectIntent {
            target: self.dashboard_url.clone(),
            token: auth.token.clone(),
            profile: auth.profile.clone(),
        })
    }

    /// Attempt the secure hand-off once.
    ///
    /// The in-progress flag is checked and set before the backend call. It
    /// is released on failure so a later manual attempt can run, and held
    /// after success since the page is leaving.
    pub async fn dispatch(
        &self,
        auth: Option<&AuthState>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let intent = self.intent(auth)?;

        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("redirect already in progress");
            return Ok(DispatchOutcome::AlreadyInProgress);
        }

        let result = self.secure_redirect(intent).await;
        if result.is_err() {
            self.in_progress.store(false, Ordering::Release);
        }
        result
    }

    async fn secure_redirect(&self, intent: RedirectIntent) -> Result<DispatchOutcome, DispatchError> {
        let req = DashboardTokenRequest {
            dashboard_url: self.dashboard_url.to_string(),
            user_agent: self.user_agent.clone(),
        };

        let dashboard_token = match self.backend.dashboard_token(&intent.token, &req).await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(err = %error, "dashboard token exchange failed");
                return Err(DispatchError::Exchange { intent, error });
            }
        };

        let action = match self.backend.callback_url() {
            Ok(url) => url,
            Err(e) => return Err(DispatchError::Navigation { intent, message: e.to_string() }),
        };
        let form = intent.to_form(action, &dashboard_token);
        tracing::info!(action = %form.action, user = %intent.profile.id, "submitting secure redirect");
        if let Err(e) = self.navigator.navigate(Navigation::SubmitForm(form)).await {
            tracing::warn!(err = %e, "secure redirect submission failed");
            return Err(DispatchError::Navigation { intent, message: e.to_string() });
        }
        Ok(DispatchOutcome::Redirected)
    }

    /// Fallback URL for `intent`, stamped with the current time.
    pub fn fallback_url(&self, intent: &RedirectIntent) -> Url {
        intent.fallback_url(epoch_ms())
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
