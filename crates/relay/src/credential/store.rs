// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value storage scopes and the credential store built on top of them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::credential::{UserProfile, SESSION_TOKEN_KEY, TOKEN_KEY, USER_KEY};

/// A client-local string key-value scope.
///
/// Object-safe for use as `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// In-memory scope. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

/// Bearer token and profile persisted across the durable and session scopes.
///
/// Write failures are logged and swallowed: the in-memory auth state stays
/// valid and the next resolution re-persists.
#[derive(Clone)]
pub struct CredentialStore {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Store backed by two fresh [`MemoryStore`]s.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    pub fn durable(&self) -> &Arc<dyn KeyValueStore> {
        &self.durable
    }

    pub fn session(&self) -> &Arc<dyn KeyValueStore> {
        &self.session
    }

    /// Durable token, ignoring empty values.
    pub fn durable_token(&self) -> Option<String> {
        non_empty(self.durable.get(TOKEN_KEY))
    }

    /// Session-scoped token copy, ignoring empty values.
    pub fn session_token(&self) -> Option<String> {
        non_empty(self.session.get(SESSION_TOKEN_KEY))
    }

    /// Write the token into both scopes.
    pub fn save_token(&self, token: &str) {
        self.save_durable_token(token);
        self.save_session_token(token);
    }

    pub fn save_durable_token(&self, token: &str) {
        if let Err(e) = self.durable.set(TOKEN_KEY, token) {
            tracing::warn!(err = %e, "failed to persist durable token");
        }
    }

    pub fn save_session_token(&self, token: &str) {
        if let Err(e) = self.session.set(SESSION_TOKEN_KEY, token) {
            tracing::warn!(err = %e, "failed to persist session token");
        }
    }

    /// Raw stored profile JSON, if any.
    pub fn stored_profile(&self) -> Option<String> {
        non_empty(self.durable.get(USER_KEY))
    }

    pub fn save_profile(&self, profile: &UserProfile) {
        let json = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(err = %e, "failed to encode profile");
                return;
            }
        };
        if let Err(e) = self.durable.set(USER_KEY, &json) {
            tracing::warn!(err = %e, "failed to persist profile");
        }
    }

    /// Remove the token and profile from the durable scope and drop the
    /// session scope entirely.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.durable.remove(key) {
                tracing::warn!(key, err = %e, "failed to remove durable key");
            }
        }
        if let Err(e) = self.session.clear() {
            tracing::warn!(err = %e, "failed to clear session scope");
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
