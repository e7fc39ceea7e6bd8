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

//! Combines the drag and long-press pause sources into one signal.

use derive_more::Display;
use strum_macros::IntoStaticStr;
use tracing::debug;

use crate::{config::AutoplayConfig, metrics::PAUSE_EDGES};

/// One of the gestures that can hold autoplay paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PauseSource {
    Drag,
    LongPress,
}

/// Change of the combined pause signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PauseEdge {
    Began,
    Ended,
}

/// Owns the two pause booleans. `is_paused` is always recomputed from them,
/// never stored.
#[derive(Debug, Clone)]
pub struct PauseCoordinator {
    drag_active:         bool,
    long_press_active:   bool,
    // Long press began but its thresholds are not yet satisfied.
    long_press_armed:    bool,
    pause_on_drag:       bool,
    pause_on_long_press: bool,
}

impl PauseCoordinator {
    pub const fn new(config: &AutoplayConfig) -> Self {
        Self {
            drag_active:         false,
            long_press_active:   false,
            long_press_armed:    false,
            pause_on_drag:       config.pause_on_drag,
            pause_on_long_press: config.pause_on_long_press,
        }
    }

    pub const fn is_drag_active(&self) -> bool { self.drag_active }

    pub const fn is_long_press_active(&self) -> bool { self.long_press_active }

    /// Whether a long press has begun and not yet started or ended.
    pub const fn is_long_press_armed(&self) -> bool { self.long_press_armed }

    /// Logical OR of the sources that are allowed to pause.
    pub const fn is_paused(&self) -> bool {
        (self.pause_on_drag && self.drag_active)
            || (self.pause_on_long_press && self.long_press_active)
    }

    /// Taps are ignored while a long press is held, whether or not the long
    /// press is allowed to pause autoplay.
    pub const fn suppresses_taps(&self) -> bool { self.long_press_active }

    pub fn set_drag_active(&mut self, active: bool) -> Option<PauseEdge> {
        self.set(PauseSource::Drag, active)
    }

    /// Long press touched down. Does not pause; the source only turns on
    /// once `long_press_start` confirms the thresholds.
    pub fn long_press_begin(&mut self) { self.long_press_armed = true; }

    pub fn long_press_start(&mut self) -> Option<PauseEdge> {
        self.long_press_armed = false;
        self.set(PauseSource::LongPress, true)
    }

    pub fn long_press_end(&mut self) -> Option<PauseEdge> {
        self.long_press_armed = false;
        self.set(PauseSource::LongPress, false)
    }

    fn set(&mut self, source: PauseSource, active: bool) -> Option<PauseEdge> {
        let before = self.is_paused();
        let slot = match source {
            PauseSource::Drag => &mut self.drag_active,
            PauseSource::LongPress => &mut self.long_press_active,
        };
        *slot = active;
        let after = self.is_paused();

        let edge = match (before, after) {
            (false, true) => PauseEdge::Began,
            (true, false) => PauseEdge::Ended,
            _ => return None,
        };
        debug!(%source, active, %edge, "pause signal changed");
        PAUSE_EDGES
            .with_label_values(&[<&'static str>::from(edge)])
            .inc();
        Some(edge)
    }
}
