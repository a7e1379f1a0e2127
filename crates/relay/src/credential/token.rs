// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active token resolution: URL parameter, then durable scope, then session
//! scope.

use serde::Serialize;

use crate::credential::store::CredentialStore;
use crate::error::RelayError;
use crate::location::InboundParams;

/// Where the active token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    Url,
    Durable,
    Session,
}

/// The token that authenticates this page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub source: TokenSource,
}

/// Pick the active token and normalize storage so the next resolution on
/// this device succeeds without a URL parameter.
///
/// A URL token is written to both scopes. A stored token is copied into
/// whichever scope is missing it. Stripping the token from the visible URL
/// is left to the caller, after the profile has been read from the same URL.
pub fn resolve_token(
    params: &InboundParams,
    store: &CredentialStore,
) -> Result<ResolvedToken, RelayError> {
    let durable = store.durable_token();
    let session = store.session_token();

    tracing::debug!(
        url = params.token.is_some(),
        durable = durable.is_some(),
        session = session.is_some(),
        "token candidates"
    );

    let resolved = if let Some(token) = params.token.clone() {
        store.save_token(&token);
        ResolvedToken { token, source: TokenSource::Url }
    } else if let Some(token) = durable {
        if session.is_none() {
            store.save_session_token(&token);
        }
        ResolvedToken { token, source: TokenSource::Durable }
    } else if let Some(token) = session {
        store.save_durable_token(&token);
        ResolvedToken { token, source: TokenSource::Session }
    } else {
        return Err(RelayError::unauthenticated());
    };

    tracing::debug!(source = ?resolved.source, "token resolved");
    Ok(resolved)
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
