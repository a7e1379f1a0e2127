// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound hand-off to the dashboard application.
//!
//! The secure path exchanges the bearer token for a short-lived dashboard
//! token and submits it in a POST body to the backend callback. The fallback
//! path puts the bearer token and profile on the dashboard's login URL.

pub mod countdown;
pub mod dispatcher;
pub mod driver;
pub mod navigator;

use std::future::Future;
use std::pin::Pin;

use url::Url;

use crate::credential::profile::encode_component;
use crate::credential::UserProfile;
use crate::location::{PARAM_TOKEN, PARAM_USER_EMAIL, PARAM_USER_ID, PARAM_USER_NAME, PARAM_USER_ROLE};

/// Path on the dashboard origin that accepts a fallback hand-off.
pub const FALLBACK_PATH: &str = "/login";

/// A navigation the hosting page performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Replace the current page.
    Assign(Url),
    /// Open in a new browsing context, leaving the current page in place.
    Open(Url),
    /// Submit a form-encoded POST and follow wherever it leads.
    SubmitForm(FormSubmission),
}

impl Navigation {
    /// URL whose query string is exposed by this navigation.
    pub fn visible_url(&self) -> &Url {
        match self {
            Self::Assign(url) | Self::Open(url) => url,
            Self::SubmitForm(form) => &form.action,
        }
    }
}

/// A POST form submission: action URL plus ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub action: Url,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Performs navigations on behalf of the relay.
///
/// Object-safe for use as `Arc<dyn Navigator>`.
pub trait Navigator: Send + Sync {
    fn navigate(&self, nav: Navigation) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;
}

/// What a redirect attempt transmits. Built per attempt and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectIntent {
    pub target: Url,
    pub token: String,
    pub profile: UserProfile,
}

impl RedirectIntent {
    /// Fallback hand-off URL on the dashboard origin, carrying the bearer
    /// token and profile in the query string.
    ///
    /// Name and email are encoded once more before going on the query string;
    /// the receiving side decodes them twice.
    pub fn fallback_url(&self, timestamp_ms: u64) -> Url {
        let mut url = self.target.join(FALLBACK_PATH).unwrap_or_else(|_| self.target.clone());
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .append_pair(PARAM_TOKEN, &self.token)
            .append_pair(PARAM_USER_ID, &self.profile.id)
            .append_pair(PARAM_USER_NAME, &encode_component(&self.profile.name))
            .append_pair(PARAM_USER_EMAIL, &encode_component(&self.profile.email))
            .append_pair(PARAM_USER_ROLE, &self.profile.role)
            .append_pair("fallback", "true")
            .append_pair("timestamp", &timestamp_ms.to_string());
        url
    }

    /// Secure hand-off form. Carries the dashboard token, never the bearer
    /// token.
    pub fn to_form(&self, action: Url, dashboard_token: &str) -> FormSubmission {
        let p = &self.profile;
        FormSubmission {
            action,
            fields: vec![
                (PARAM_TOKEN.to_owned(), dashboard_token.to_owned()),
                (PARAM_USER_ID.to_owned(), p.id.clone()),
                (PARAM_USER_NAME.to_owned(), p.name.clone()),
                (PARAM_USER_EMAIL.to_owned(), p.email.clone()),
                (PARAM_USER_ROLE.to_owned(), p.role.clone()),
                ("redirect".to_owned(), self.target.to_string()),
            ],
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
