// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session credentials: the bearer token and user profile shared between the
//! main app and the dashboard.
//!
//! Both live in two client-local scopes. The durable scope survives restarts
//! and is authoritative; the session scope holds a redundant token copy and is
//! dropped when the session ends. Resolution on page load checks the inbound
//! URL first, then the durable scope, then the session scope.

pub mod persist;
pub mod profile;
pub mod store;
pub mod token;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Durable key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Durable key holding the JSON-encoded [`UserProfile`].
pub const USER_KEY: &str = "user";
/// Session key holding the redundant bearer token copy.
pub const SESSION_TOKEN_KEY: &str = "dashboard_token";

pub const DEFAULT_USER_ID: &str = "1";
pub const DEFAULT_USER_NAME: &str = "User";
pub const DEFAULT_USER_EMAIL: &str = "user@stms.ai";
pub const DEFAULT_USER_ROLE: &str = "user";

/// Authenticated user profile. Always fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            id: DEFAULT_USER_ID.to_owned(),
            name: DEFAULT_USER_NAME.to_owned(),
            email: DEFAULT_USER_EMAIL.to_owned(),
            role: DEFAULT_USER_ROLE.to_owned(),
        }
    }
}

/// Profile as it may appear on the wire or in storage, with any field absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialProfile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl PartialProfile {
    /// Read a profile from loosely shaped JSON. Returns `None` unless `value`
    /// is an object.
    ///
    /// Backends disagree on the id field, so `id` is tried before `_id` and
    /// numeric ids are accepted. Fields of any other type read as absent.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_owned);
        let id = ["id", "_id"].into_iter().find_map(|key| match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });
        Some(Self { id, name: text("name"), email: text("email"), role: text("role") })
    }

    /// Fill every missing or empty field with its default.
    pub fn complete(self) -> UserProfile {
        fn or(value: Option<String>, default: &str) -> String {
            value.filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_owned())
        }
        UserProfile {
            id: or(self.id, DEFAULT_USER_ID),
            name: or(self.name, DEFAULT_USER_NAME),
            email: or(self.email, DEFAULT_USER_EMAIL),
            role: or(self.role, DEFAULT_USER_ROLE),
        }
    }
}

/// In-memory auth state of a page once both resolvers have run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub token: String,
    pub token_source: token::TokenSource,
    pub profile: UserProfile,
    pub profile_source: profile::ProfileSource,
}

/// Which client-local scope a value lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    Durable,
    Session,
}

/// Default state directory for relay data: `$XDG_STATE_HOME/stms/relay`,
/// then `$HOME/.local/state/stms/relay`, then `.stms/relay`.
pub fn state_dir() -> PathBuf {
    state_dir_from(std::env::var("XDG_STATE_HOME").ok(), std::env::var("HOME").ok())
}

fn state_dir_from(xdg_state_home: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(xdg) = xdg_state_home.filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("stms/relay");
    }
    if let Some(home) = home.filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local/state/stms/relay");
    }
    PathBuf::from(".stms/relay")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
