// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the STMS auth backend.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::backend::{
    AuthBackend, BackendError, BoxFuture, DashboardTokenRequest, DashboardTokenResponse,
    LoginRequest, LoginResponse, LoginSuccess, DASHBOARD_CALLBACK_PATH, DASHBOARD_TOKEN_PATH,
    LOGIN_PATH,
};
use crate::credential::PartialProfile;

/// HTTP client wrapper for one backend deployment.
pub struct BackendClient {
    base_url: Url,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: Url, user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();
        Self { base_url, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn do_login(&self, req: &LoginRequest) -> Result<LoginSuccess, BackendError> {
        let resp = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(req)
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;

        let status = resp.status();
        let body: LoginResponse = resp.json().await.unwrap_or_default();

        if !status.is_success() {
            let message = body.message.unwrap_or_else(|| "Login failed".to_owned());
            return Err(BackendError::status(status.as_u16(), message));
        }

        match body.token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let user = body.user.as_ref().and_then(PartialProfile::from_json);
                Ok(LoginSuccess { token, user })
            }
            None => Err(BackendError::status(status.as_u16(), "No token received from server")),
        }
    }

    async fn do_dashboard_token(
        &self,
        bearer: &str,
        req: &DashboardTokenRequest,
    ) -> Result<String, BackendError> {
        let resp = self
            .client
            .post(self.url(DASHBOARD_TOKEN_PATH))
            .bearer_auth(bearer)
            .json(req)
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;

        let status = resp.status();
        let body: DashboardTokenResponse = resp.json().await.unwrap_or_default();

        if !status.is_success() {
            let message =
                body.error.unwrap_or_else(|| "Failed to get dashboard token".to_owned());
            return Err(BackendError::status(status.as_u16(), message));
        }

        body.dashboard_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BackendError::status(status.as_u16(), "No dashboard token received"))
    }
}

impl AuthBackend for BackendClient {
    fn login<'a>(&'a self, req: &'a LoginRequest) -> BoxFuture<'a, Result<LoginSuccess, BackendError>> {
        Box::pin(self.do_login(req))
    }

    fn dashboard_token<'a>(
        &'a self,
        bearer: &'a str,
        req: &'a DashboardTokenRequest,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        Box::pin(self.do_dashboard_token(bearer, req))
    }

    fn callback_url(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(&self.url(DASHBOARD_CALLBACK_PATH))?)
    }
}
