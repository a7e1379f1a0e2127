// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire contract of the STMS auth backend and the seam the relay calls it
//! through.

pub mod client;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::credential::PartialProfile;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const DASHBOARD_TOKEN_PATH: &str = "/api/auth/dashboard-token";
pub const DASHBOARD_CALLBACK_PATH: &str = "/api/auth/dashboard-callback";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Calls the relay makes against the auth backend.
///
/// Object-safe for use as `Arc<dyn AuthBackend>`.
pub trait AuthBackend: Send + Sync {
    /// `POST /api/auth/login`.
    fn login<'a>(&'a self, req: &'a LoginRequest) -> BoxFuture<'a, Result<LoginSuccess, BackendError>>;

    /// `POST /api/auth/dashboard-token`, authenticated with the bearer token.
    /// Returns the short-lived dashboard token.
    fn dashboard_token<'a>(
        &'a self,
        bearer: &'a str,
        req: &'a DashboardTokenRequest,
    ) -> BoxFuture<'a, Result<String, BackendError>>;

    /// Absolute URL of the form-encoded dashboard callback endpoint.
    fn callback_url(&self) -> anyhow::Result<Url>;
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Raw login response body. Success carries `token` and `user`; failure
/// carries `message`.
///
/// `user` stays untyped so a profile in an unexpected shape never costs the
/// token; it is read with [`PartialProfile::from_json`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A login that produced a token.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub token: String,
    pub user: Option<PartialProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTokenRequest {
    pub dashboard_url: String,
    pub user_agent: String,
}

/// Raw dashboard-token response body. Success carries `dashboardToken`;
/// failure carries `error`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTokenResponse {
    #[serde(default)]
    pub dashboard_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A failed backend call. `status` is `None` when no response arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub status: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into() }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self { status: Some(status), message: message.into() }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for BackendError {}
