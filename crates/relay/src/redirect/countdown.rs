// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Countdown and progress state machine for the automatic redirect.
//!
//! Both indicators are driven from one clock. Each tick advances progress by
//! a fixed step, clamped at 100, and adds the tick period to the elapsed
//! time. The countdown shows whole seconds left and expires once the elapsed
//! time reaches the full duration, whatever the tick period. Progress usually saturates before the countdown expires, so
//! the two are independent signals. On expiry progress is pinned to 100 so
//! the indicator never shows an incomplete bar while dispatching.

use std::time::Duration;

use serde::Serialize;

pub const MAX_PROGRESS: u8 = 100;

/// Lifecycle of a relay page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Counting,
    Dispatching,
    Redirected,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirected)
    }
}

/// What started a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Expired,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownConfig {
    /// Seconds before the automatic redirect fires.
    pub duration_secs: u32,
    /// Clock period.
    pub tick: Duration,
    /// Progress added per tick.
    pub progress_step: u8,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self { duration_secs: 5, tick: Duration::from_millis(100), progress_step: 4 }
    }
}

impl CountdownConfig {
    /// Milliseconds one tick adds to the elapsed time. Never zero.
    pub fn tick_ms(&self) -> u64 {
        u64::try_from(self.tick.as_millis()).unwrap_or(u64::MAX).max(1)
    }

    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_secs) * 1000
    }
}

#[derive(Debug, Clone)]
pub struct Countdown {
    config: CountdownConfig,
    phase: Phase,
    progress: u8,
    remaining_secs: u32,
    elapsed_ms: u64,
}

impl Countdown {
    pub fn new(config: CountdownConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            progress: 0,
            remaining_secs: config.duration_secs,
            elapsed_ms: 0,
        }
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Idle → Counting. A zero-length countdown expires immediately.
    pub fn start(&mut self) -> Option<Trigger> {
        if self.phase != Phase::Idle {
            return None;
        }
        self.phase = Phase::Counting;
        if self.remaining_secs == 0 {
            return self.fire(Trigger::Expired);
        }
        None
    }

    /// Advance the clock by one tick. Returns a trigger exactly once, when
    /// the countdown reaches zero.
    pub fn tick(&mut self) -> Option<Trigger> {
        if self.phase != Phase::Counting {
            return None;
        }
        self.progress = self.progress.saturating_add(self.config.progress_step).min(MAX_PROGRESS);
        self.elapsed_ms = self.elapsed_ms.saturating_add(self.config.tick_ms());
        if self.elapsed_ms >= self.config.duration_ms() {
            return self.fire(Trigger::Expired);
        }
        let elapsed_secs = u32::try_from(self.elapsed_ms / 1000).unwrap_or(u32::MAX);
        self.remaining_secs = self.config.duration_secs.saturating_sub(elapsed_secs);
        None
    }

    /// "Go now". Fires only from Idle or Counting.
    pub fn manual(&mut self) -> Option<Trigger> {
        match self.phase {
            Phase::Idle | Phase::Counting => self.fire(Trigger::Manual),
            _ => None,
        }
    }

    /// Record the dispatch result. Ignored unless a dispatch is pending.
    pub fn finish(&mut self, succeeded: bool) {
        if self.phase == Phase::Dispatching {
            self.phase = if succeeded { Phase::Redirected } else { Phase::Failed };
        }
    }

    fn fire(&mut self, trigger: Trigger) -> Option<Trigger> {
        self.phase = Phase::Dispatching;
        self.progress = MAX_PROGRESS;
        self.remaining_secs = 0;
        Some(trigger)
    }
}

#[cfg(test)]
#[path = "countdown_tests.rs"]
mod tests;
