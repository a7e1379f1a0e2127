// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Headless navigator used by the command-line relay.
//!
//! Plain navigations are recorded and logged; there is no page to replace.
//! Form submissions are POSTed for real without following redirects, and the
//! `Location` the callback answers with becomes the landing URL.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::{redirect, Client};
use url::Url;

use crate::redirect::{FormSubmission, Navigation, Navigator};

pub struct HttpNavigator {
    client: Client,
    landed: Mutex<Vec<Url>>,
}

impl HttpNavigator {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap_or_default();
        Self { client, landed: Mutex::new(Vec::new()) }
    }

    /// URLs navigated to so far, in order.
    pub fn landed(&self) -> Vec<Url> {
        self.landed.lock().clone()
    }

    pub fn last_landed(&self) -> Option<Url> {
        self.landed.lock().last().cloned()
    }

    async fn submit(&self, form: FormSubmission) -> anyhow::Result<Url> {
        let resp = self.client.post(form.action.clone()).form(&form.fields).send().await?;
        let status = resp.status();

        if status.is_redirection() {
            let location = resp
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| anyhow::anyhow!("callback redirect without location"))?;
            return Ok(form.action.join(location)?);
        }
        if !status.is_success() {
            anyhow::bail!("callback rejected hand-off: HTTP {status}");
        }
        Ok(form.action)
    }
}

impl Navigator for HttpNavigator {
    fn navigate(&self, nav: Navigation) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let url = match nav {
                Navigation::Assign(url) => {
                    tracing::info!(url = %redacted(&url), "navigate");
                    url
                }
                Navigation::Open(url) => {
                    tracing::info!(url = %redacted(&url), "open in new context");
                    url
                }
                Navigation::SubmitForm(form) => {
                    tracing::debug!(action = %form.action, "submitting form");
                    let url = self.submit(form).await?;
                    tracing::info!(url = %redacted(&url), "form submitted");
                    url
                }
            };
            self.landed.lock().push(url);
            Ok(())
        })
    }
}

/// URL without its query string, for logging.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    if url.query().is_some() {
        url.set_query(Some("redacted"));
    }
    url.to_string()
}
