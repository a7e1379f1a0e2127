// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events broadcast by the redirect driver to whatever renders the page.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::ErrorCode;
use crate::redirect::countdown::Phase;

/// User-visible state changes of a relay page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RelayEvent {
    Progress { progress: u8, remaining_secs: u32 },
    Phase { phase: Phase },
    Notice { notice: Notice },
    NoticeDismissed,
}

/// A visible error with the action the user can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub code: ErrorCode,
    pub message: String,
    pub action: NoticeAction,
    pub dismissable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeAction {
    /// Continue with the URL-parameter hand-off.
    UseFallback,
    /// Go back to the main app's login page.
    ReturnToLogin,
}

impl Notice {
    pub fn exchange_failed(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ExchangeFailed,
            message: message.into(),
            action: NoticeAction::UseFallback,
            dismissable: true,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Precondition,
            message: message.into(),
            action: NoticeAction::ReturnToLogin,
            dismissable: false,
        }
    }
}

/// Create the event channel shared by a driver and its subscribers.
pub fn channel() -> (broadcast::Sender<RelayEvent>, broadcast::Receiver<RelayEvent>) {
    broadcast::channel(64)
}
