// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Autoplay progress timer.
//!
//! ```text
//! Idle ──start──▶ Running ──ramp hits 1──▶ Completed ──reset──▶ Idle
//!                  │   ▲
//!             pause│   │resume (same page, same activation)
//!                  ▼   │
//!                 Paused
//! ```
//!
//! `start` is accepted from any phase and discards whatever run was there.

use std::time::Duration;

use derive_more::Display;
use tracing::{debug, trace};

use crate::metrics::AUTOPLAY_COMPLETIONS;

/// Identity of the (page, item) a timer run belongs to.
///
/// `activation` is the pager's activation counter at start time; a page that
/// was left and re-entered carries a different value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("page {page} item {item} (activation {activation})")]
pub struct RunOwner {
    pub page:       usize,
    pub item:       usize,
    pub activation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, strum_macros::IntoStaticStr)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Outcome of [`AutoplayTimer::resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The ramp continues for the remaining share of the duration.
    Resumed { remaining: Duration },
    /// The owning page is no longer the same active page; nothing changed.
    Stale,
    /// The timer was not paused; nothing changed.
    NotPaused,
}

/// Linear 0→1 ramp over an item's duration, pausable and resumable.
#[derive(Debug, Clone)]
pub struct AutoplayTimer {
    phase:            TimerPhase,
    owner:            Option<RunOwner>,
    duration:         Duration,
    progress:         f32,
    elapsed_at_pause: f32,
    // Current ramp segment: a fresh start runs 0→1 over `duration`, a resume
    // runs `segment_from`→1 over the remaining share.
    segment_from:     f32,
    segment_length:   Duration,
    segment_elapsed:  Duration,
}

impl Default for AutoplayTimer {
    fn default() -> Self { Self::new() }
}

impl AutoplayTimer {
    pub const fn new() -> Self {
        Self {
            phase:            TimerPhase::Idle,
            owner:            None,
            duration:         Duration::ZERO,
            progress:         0.0,
            elapsed_at_pause: 0.0,
            segment_from:     0.0,
            segment_length:   Duration::ZERO,
            segment_elapsed:  Duration::ZERO,
        }
    }

    pub const fn phase(&self) -> TimerPhase { self.phase }

    pub const fn owner(&self) -> Option<RunOwner> { self.owner }

    pub const fn progress(&self) -> f32 { self.progress }

    pub const fn duration(&self) -> Duration { self.duration }

    /// Progress recorded by the last `pause`.
    pub const fn elapsed_at_pause(&self) -> f32 { self.elapsed_at_pause }

    pub fn is_running(&self) -> bool { self.phase == TimerPhase::Running }

    /// Progress as seen by `page`: pages that do not own the run read 0.
    pub fn progress_for(&self, page: usize) -> f32 {
        match self.owner {
            Some(owner) if owner.page == page => self.progress,
            _ => 0.0,
        }
    }

    /// Time left until completion at the current phase's pace.
    pub fn remaining(&self) -> Duration {
        match self.phase {
            TimerPhase::Running => self.segment_length.saturating_sub(self.segment_elapsed),
            TimerPhase::Paused => self.duration.mul_f32(1.0 - self.elapsed_at_pause),
            TimerPhase::Idle | TimerPhase::Completed => Duration::ZERO,
        }
    }

    /// Discards any current run and starts a new one from 0.
    pub fn start(&mut self, owner: RunOwner, duration: Duration) {
        if let Some(previous) = self.owner {
            if matches!(self.phase, TimerPhase::Running | TimerPhase::Paused) {
                trace!(%previous, "autoplay run discarded");
            }
        }
        debug!(%owner, ?duration, "autoplay started");
        self.phase = TimerPhase::Running;
        self.owner = Some(owner);
        self.duration = duration;
        self.progress = 0.0;
        self.elapsed_at_pause = 0.0;
        self.segment_from = 0.0;
        self.segment_length = duration;
        self.segment_elapsed = Duration::ZERO;
    }

    /// Halts the ramp. Only meaningful while running; returns whether the
    /// timer was paused by this call.
    pub fn pause(&mut self) -> bool {
        if self.phase != TimerPhase::Running {
            return false;
        }
        self.elapsed_at_pause = self.progress;
        self.phase = TimerPhase::Paused;
        debug!(progress = self.progress, "autoplay paused");
        true
    }

    /// Continues a paused ramp if `page` at `activation` still owns it.
    pub fn resume(&mut self, page: usize, activation: u64) -> ResumeOutcome {
        if self.phase != TimerPhase::Paused {
            return ResumeOutcome::NotPaused;
        }
        let Some(owner) = self.owner else {
            return ResumeOutcome::NotPaused;
        };
        if owner.page != page || owner.activation != activation {
            debug!(%owner, page, activation, "stale autoplay resume ignored");
            return ResumeOutcome::Stale;
        }
        let remaining = self.duration.mul_f32(1.0 - self.elapsed_at_pause);
        self.segment_from = self.elapsed_at_pause;
        self.segment_length = remaining;
        self.segment_elapsed = Duration::ZERO;
        self.phase = TimerPhase::Running;
        debug!(from = self.elapsed_at_pause, ?remaining, "autoplay resumed");
        ResumeOutcome::Resumed { remaining }
    }

    /// Returns to idle, dropping the run without completing it.
    pub fn reset(&mut self) {
        if matches!(self.phase, TimerPhase::Running | TimerPhase::Paused) {
            trace!(owner = ?self.owner, "autoplay run cancelled");
        }
        *self = Self::new();
    }

    /// Advances the ramp. Returns the run owner exactly once, on the tick
    /// that reaches 1.
    pub fn tick(&mut self, dt: Duration) -> Option<RunOwner> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.segment_elapsed += dt;
        if self.segment_elapsed >= self.segment_length {
            self.progress = 1.0;
            self.phase = TimerPhase::Completed;
            AUTOPLAY_COMPLETIONS.inc();
            debug!(owner = ?self.owner, "autoplay completed");
            return self.owner;
        }
        let fraction = self.segment_elapsed.as_secs_f32() / self.segment_length.as_secs_f32();
        self.progress = self.segment_from + (1.0 - self.segment_from) * fraction;
        None
    }
}
