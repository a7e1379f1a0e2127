// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No token resolvable from any source.
    Unauthenticated,
    /// Stored profile JSON could not be parsed. Recovered locally.
    MalformedProfile,
    /// The backend refused or failed the dashboard token exchange.
    ExchangeFailed,
    /// Token or profile missing at dispatch time.
    Precondition,
    BadRequest,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::MalformedProfile => "MALFORMED_PROFILE",
            Self::ExchangeFailed => "EXCHANGE_FAILED",
            Self::Precondition => "PRECONDITION",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error(&self, message: impl Into<String>) -> RelayError {
        RelayError { code: *self, message: message.into() }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relay error with machine-readable code and human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayError {
    pub code: ErrorCode,
    pub message: String,
}

impl RelayError {
    pub fn unauthenticated() -> Self {
        ErrorCode::Unauthenticated.to_error("no token found in url, durable or session storage")
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RelayError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
