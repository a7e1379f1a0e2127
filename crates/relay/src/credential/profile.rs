// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active profile resolution: URL fields, then stored JSON, then the default
//! profile. The result is always written back to the durable scope.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::credential::store::CredentialStore;
use crate::credential::{PartialProfile, UserProfile};
use crate::error::ErrorCode;
use crate::location::InboundParams;

/// Where the active profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    Url,
    Stored,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub profile: UserProfile,
    pub source: ProfileSource,
}

pub fn resolve_profile(params: &InboundParams, store: &CredentialStore) -> ResolvedProfile {
    let resolved = match from_params(params) {
        Some(profile) => ResolvedProfile { profile, source: ProfileSource::Url },
        None => match from_store(store) {
            Some(profile) => ResolvedProfile { profile, source: ProfileSource::Stored },
            None => ResolvedProfile { profile: UserProfile::default(), source: ProfileSource::Default },
        },
    };
    store.save_profile(&resolved.profile);
    tracing::debug!(source = ?resolved.source, user = %resolved.profile.id, "profile resolved");
    resolved
}

/// Build a profile from URL fields. Requires both a name and an email.
fn from_params(params: &InboundParams) -> Option<UserProfile> {
    let name = params.user_name.as_deref()?;
    let email = params.user_email.as_deref()?;
    let partial = PartialProfile {
        id: params.user_id.clone(),
        name: Some(decode_component(name).into_owned()),
        email: Some(decode_component(email).into_owned()),
        role: params.user_role.clone(),
    };
    Some(partial.complete())
}

fn from_store(store: &CredentialStore) -> Option<UserProfile> {
    let raw = store.stored_profile()?;
    let value = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Null) => return None,
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(code = %ErrorCode::MalformedProfile, err = %e, "discarding stored profile");
            return None;
        }
    };
    match PartialProfile::from_json(&value) {
        Some(partial) => Some(partial.complete()),
        None => {
            tracing::warn!(code = %ErrorCode::MalformedProfile, "discarding stored profile: not an object");
            None
        }
    }
}

/// Characters a URI component encoder leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a value as a URI component. Inverse of
/// [`decode_component`] for any UTF-8 input.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Decode a value that may have been percent-encoded once more before being
/// placed on the query string. Values that do not decode to UTF-8 are kept
/// as received.
pub fn decode_component(value: &str) -> Cow<'_, str> {
    match percent_decode_str(value).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(value),
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
