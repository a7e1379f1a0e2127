// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The current page URL and the relay parameters it may carry.

use url::Url;

pub const PARAM_TOKEN: &str = "token";
pub const PARAM_USER_ID: &str = "userId";
pub const PARAM_USER_NAME: &str = "userName";
pub const PARAM_USER_EMAIL: &str = "userEmail";
pub const PARAM_USER_ROLE: &str = "userRole";

/// Every query parameter the relay consumes on arrival.
pub const RELAY_PARAMS: [&str; 5] =
    [PARAM_TOKEN, PARAM_USER_ID, PARAM_USER_NAME, PARAM_USER_EMAIL, PARAM_USER_ROLE];

/// The visible URL of the current page.
///
/// Stands in for the browser location bar: the relay reads inbound
/// parameters from it and rewrites it in place (without navigating) to drop
/// credentials once they have been captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(input: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Url::parse(input)?))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// First value of a query parameter, form-decoded. Empty values read as
    /// absent.
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.url.query_pairs().any(|(k, _)| k == name)
    }

    /// Remove the named parameters from the visible URL, keeping all others
    /// in order. Drops the `?` entirely when nothing remains.
    pub fn strip_params(&mut self, names: &[&str]) {
        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| !names.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    /// Snapshot of the relay parameters currently on the URL.
    pub fn inbound(&self) -> InboundParams {
        InboundParams {
            token: self.param(PARAM_TOKEN),
            user_id: self.param(PARAM_USER_ID),
            user_name: self.param(PARAM_USER_NAME),
            user_email: self.param(PARAM_USER_EMAIL),
            user_role: self.param(PARAM_USER_ROLE),
        }
    }
}

/// Relay parameters captured from an inbound URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundParams {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_role: Option<String>,
}

#[cfg(test)]
#[path = "location_tests.rs"]
mod tests;
