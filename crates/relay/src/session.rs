// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Page-level session operations: bootstrap on arrival, login, logout and the
//! unauthenticated bounce back to the main app.

use std::time::Duration;

use url::Url;

use crate::backend::{AuthBackend, LoginRequest};
use crate::credential::profile::{resolve_profile, ProfileSource};
use crate::credential::store::CredentialStore;
use crate::credential::token::{resolve_token, TokenSource};
use crate::credential::{AuthState, PartialProfile};
use crate::error::{ErrorCode, RelayError};
use crate::location::{InboundParams, PageLocation, RELAY_PARAMS};
use crate::redirect::{Navigation, Navigator};

pub const LOGIN_PAGE_PATH: &str = "/login";
pub const LOGOUT_PAGE_PATH: &str = "/logout";

/// Resolve the token and profile for a page that just loaded at `location`.
///
/// When the token arrived on the URL, every relay parameter is stripped from
/// `location` afterwards so credentials do not linger in the address bar or
/// history. Unrelated parameters are kept.
pub fn bootstrap(location: &mut PageLocation, store: &CredentialStore) -> Result<AuthState, RelayError> {
    let params = location.inbound();
    let token = resolve_token(&params, store)?;
    let profile = resolve_profile(&params, store);

    if token.source == TokenSource::Url {
        location.strip_params(&RELAY_PARAMS);
        tracing::debug!("relay parameters stripped from location");
    }

    tracing::info!(
        token_source = ?token.source,
        profile_source = ?profile.source,
        user = %profile.profile.id,
        "session bootstrapped"
    );
    Ok(AuthState {
        token: token.token,
        token_source: token.source,
        profile: profile.profile,
        profile_source: profile.source,
    })
}

/// Auth state from storage alone, as seen by a page with no relay parameters.
pub fn current(store: &CredentialStore) -> Result<AuthState, RelayError> {
    let params = InboundParams::default();
    let token = resolve_token(&params, store)?;
    let profile = resolve_profile(&params, store);
    Ok(AuthState {
        token: token.token,
        token_source: token.source,
        profile: profile.profile,
        profile_source: profile.source,
    })
}

/// Log in against the backend and persist the result.
///
/// The token goes to both scopes. The profile is stored with missing fields
/// filled; a response without a user stores the default profile.
pub async fn login(
    backend: &dyn AuthBackend,
    store: &CredentialStore,
    email: &str,
    password: &str,
) -> Result<AuthState, RelayError> {
    let req = LoginRequest { email: email.to_owned(), password: password.to_owned() };
    let success = backend.login(&req).await.map_err(|e| {
        let code = if e.status.is_some() { ErrorCode::Unauthenticated } else { ErrorCode::Internal };
        code.to_error(e.message)
    })?;

    let profile_source = if success.user.is_some() { ProfileSource::Stored } else { ProfileSource::Default };
    let profile = success.user.map(PartialProfile::complete).unwrap_or_default();
    store.save_token(&success.token);
    store.save_profile(&profile);

    tracing::info!(user = %profile.id, "logged in");
    Ok(AuthState { token: success.token, token_source: TokenSource::Durable, profile, profile_source })
}

/// Clear stored credentials and send the page to the main app's logout
/// route.
pub async fn logout(
    store: &CredentialStore,
    navigator: &dyn Navigator,
    main_app_url: &Url,
) -> anyhow::Result<Url> {
    store.clear();
    let url = main_app_url.join(LOGOUT_PAGE_PATH)?;
    tracing::info!("logged out");
    navigator.navigate(Navigation::Assign(url.clone())).await?;
    Ok(url)
}

/// Send an unauthenticated page to the main app's login route after `delay`.
pub async fn redirect_to_login(
    navigator: &dyn Navigator,
    main_app_url: &Url,
    delay: Duration,
) -> anyhow::Result<Url> {
    let url = main_app_url.join(LOGIN_PAGE_PATH)?;
    tracing::info!(delay_ms = delay.as_millis() as u64, "no session, returning to login");
    tokio::time::sleep(delay).await;
    navigator.navigate(Navigation::Assign(url.clone())).await?;
    Ok(url)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
