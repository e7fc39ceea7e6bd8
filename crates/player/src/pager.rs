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

//! Outer page pager: continuous drag offset, spring settle, settled index.
//!
//! Offsets follow the horizontal-scroll convention: page `n` rests at
//! `-n * page_width`, so dragging left (negative translation) moves toward
//! higher pages.

use std::{collections::VecDeque, time::Duration};

use tracing::{debug, info, trace};

use crate::{
    config::{PlayerConfig, SpringConfig},
    metrics::{BOUNDARY_HITS, PAGE_CHANGES},
    observe::{PlayerEvent, Transition, Watched},
    spring::{Spring, SpringTick},
};

/// Outcome of a page change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// A spring toward `target` is in flight.
    Accepted { target: usize },
    /// The target was before the first page; nothing changed.
    ReachedFirstPage,
    /// The target was past the last page; nothing changed.
    ReachedLastPage,
}

/// Outcome of feeding one drag update to the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragUpdate {
    /// No drag in progress, or still under the pan distance threshold.
    Ignored,
    /// This update turned the touch into a drag; the offset moved.
    Activated,
    /// The offset moved.
    Moved,
    /// The candidate offset was outside the bounce bounds and was dropped.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragPhase {
    Idle,
    /// Touch down seen, no movement past the threshold yet.
    Pending,
    Active,
}

/// Owns the drag offset and the settled page index.
#[derive(Debug)]
pub struct PagePager {
    page_count:         usize,
    page_width:         f32,
    min_distance:       f32,
    min_fling_velocity: f32,
    bounce_threshold:   f32,
    spring_config:      SpringConfig,

    offset:         f32,
    saved_offset:   f32,
    drag:           DragPhase,
    spring:         Option<Spring>,
    pending_target: Option<usize>,
    settled:        Watched<usize>,
    activation:     u64,
    events:         VecDeque<PlayerEvent>,
}

impl PagePager {
    /// Creates a pager resting on `initial_page`. The caller has already
    /// validated that `initial_page < page_count`.
    pub fn new(page_count: usize, config: &PlayerConfig) -> Self {
        let initial_page = config.initial_page_index.min(page_count.saturating_sub(1));
        let offset = -(initial_page as f32) * config.page_width;
        Self {
            page_count,
            page_width: config.page_width,
            min_distance: config.gesture.min_distance,
            min_fling_velocity: config.gesture.min_fling_velocity,
            bounce_threshold: config.gesture.bounce_threshold,
            spring_config: config.spring.clone(),
            offset,
            saved_offset: offset,
            drag: DragPhase::Idle,
            spring: None,
            pending_target: None,
            settled: Watched::new(initial_page),
            activation: 0,
            events: VecDeque::new(),
        }
    }

    pub const fn page_count(&self) -> usize { self.page_count }

    pub const fn page_width(&self) -> f32 { self.page_width }

    pub const fn settled_page_index(&self) -> usize { self.settled.get() }

    /// Raw offset as last written by a drag or the spring.
    pub const fn current_offset(&self) -> f32 { self.offset }

    /// Offset recorded when the current drag began.
    pub const fn saved_offset(&self) -> f32 { self.saved_offset }

    pub fn is_dragging(&self) -> bool { self.drag == DragPhase::Active }

    pub const fn is_settling(&self) -> bool { self.spring.is_some() }

    /// Page the in-flight spring is heading for.
    pub const fn pending_target(&self) -> Option<usize> { self.pending_target }

    /// Whether an in-flight spring will move the pager off the settled page.
    pub fn is_leaving_settled_page(&self) -> bool {
        self.pending_target
            .is_some_and(|target| target != self.settled.get())
    }

    /// Counter bumped every time the settled page changes. Two reads with the
    /// same value bracket an uninterrupted stay on one page.
    pub const fn activation(&self) -> u64 { self.activation }

    /// Allowed offset range: `[-(last + bounce), bounce] * page_width`.
    pub fn offset_bounds(&self) -> (f32, f32) {
        let last = self.page_count.saturating_sub(1) as f32;
        (
            -(last + self.bounce_threshold) * self.page_width,
            self.bounce_threshold * self.page_width,
        )
    }

    /// Fractional page position derived from the clamped offset.
    pub fn page_progress(&self) -> f32 {
        let (min, max) = self.offset_bounds();
        -self.offset.clamp(min, max) / self.page_width
    }

    /// Drains events raised since the last call, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = PlayerEvent> + '_ { self.events.drain(..) }

    /// Springs to the absolute page `index`.
    ///
    /// Out-of-range targets raise a boundary event instead and leave all
    /// state untouched.
    pub fn set_page_index(&mut self, index: isize) -> PageRequest {
        if index < 0 {
            debug!(index, "page request before first page");
            BOUNDARY_HITS.with_label_values(&["first"]).inc();
            self.events.push_back(PlayerEvent::ReachedFirstPage);
            return PageRequest::ReachedFirstPage;
        }
        let target = index.unsigned_abs();
        if target >= self.page_count {
            debug!(index, "page request past last page");
            BOUNDARY_HITS.with_label_values(&["last"]).inc();
            self.events.push_back(PlayerEvent::ReachedLastPage);
            return PageRequest::ReachedLastPage;
        }
        self.spring_to(target);
        PageRequest::Accepted { target }
    }

    /// Springs `delta` pages away from the settled page.
    pub fn request_page_change(&mut self, delta: isize) -> PageRequest {
        let settled = isize::try_from(self.settled.get()).unwrap_or(isize::MAX);
        self.set_page_index(settled.saturating_add(delta))
    }

    /// Records the offset a new drag is measured from.
    pub fn begin_drag(&mut self) {
        self.saved_offset = self.offset;
        self.drag = DragPhase::Pending;
    }

    /// Applies `translation` relative to the offset saved at drag begin.
    pub fn update_drag(&mut self, translation: f32) -> DragUpdate {
        let activated = match self.drag {
            DragPhase::Idle => return DragUpdate::Ignored,
            DragPhase::Pending if translation.abs() < self.min_distance => {
                return DragUpdate::Ignored;
            }
            DragPhase::Pending => {
                self.cancel_spring();
                self.drag = DragPhase::Active;
                true
            }
            DragPhase::Active => {
                self.cancel_spring();
                false
            }
        };

        let candidate = translation + self.saved_offset;
        let (min, max) = self.offset_bounds();
        if !(min..=max).contains(&candidate) {
            trace!(candidate, min, max, "drag past bounce threshold dropped");
            return if activated {
                DragUpdate::Activated
            } else {
                DragUpdate::Rejected
            };
        }
        self.offset = candidate;
        if activated {
            DragUpdate::Activated
        } else {
            DragUpdate::Moved
        }
    }

    /// Ends the drag, springing to the page picked by position and fling.
    ///
    /// Returns the target page, or `None` when the touch never moved far
    /// enough to count as a drag.
    pub fn end_drag(&mut self, velocity: f32) -> Option<usize> {
        let was_active = self.drag == DragPhase::Active;
        self.drag = DragPhase::Idle;
        if !was_active {
            return None;
        }
        let target = self.fling_target(velocity);
        debug!(velocity, offset = self.offset, page = target, "drag ended");
        self.spring_to(target);
        Some(target)
    }

    /// Abandons the drag; an active drag settles on the nearest page.
    pub fn cancel_drag(&mut self) -> Option<usize> { self.end_drag(0.0) }

    fn fling_target(&self, velocity: f32) -> usize {
        let momentum = if velocity.abs() > self.min_fling_velocity {
            velocity.signum() * self.page_width / 2.0
        } else {
            0.0
        };
        // Halves round toward +inf: a drag of exactly one page plus a fling
        // lands on the adjacent page, not two away.
        let rounded = ((self.offset + momentum) / self.page_width + 0.5).floor();
        let last = self.page_count.saturating_sub(1) as f32;
        (-rounded).clamp(0.0, last) as usize
    }

    fn spring_to(&mut self, target: usize) {
        let destination = -(target as f32) * self.page_width;
        let velocity = self.spring.as_ref().map_or(0.0, Spring::velocity);
        if self.spring.is_some() {
            trace!(previous = ?self.pending_target, page = target, "spring retargeted");
        }
        debug!(from = self.offset, to = destination, page = target, "spring launched");
        self.spring = Some(Spring::new(
            self.offset,
            velocity,
            destination,
            &self.spring_config,
        ));
        self.pending_target = Some(target);
    }

    /// Advances the settle spring. Returns the settled page transition when
    /// the spring comes to rest on a different page than before.
    ///
    /// While a drag is active the finger owns the offset: a spring launched
    /// meanwhile is dropped without committing.
    pub fn tick(&mut self, dt: Duration) -> Option<Transition<usize>> {
        if self.drag == DragPhase::Active {
            self.cancel_spring();
            return None;
        }
        let spring = self.spring.as_mut()?;
        match spring.step(dt) {
            SpringTick::Moving(position) => {
                self.offset = position;
                None
            }
            SpringTick::Settled(position) => {
                self.offset = position;
                self.spring = None;
                let target = self.pending_target.take()?;
                self.commit(target)
            }
        }
    }

    fn cancel_spring(&mut self) {
        if self.spring.take().is_some() {
            trace!(pending = ?self.pending_target, "spring cancelled by drag");
        }
        self.pending_target = None;
    }

    fn commit(&mut self, page: usize) -> Option<Transition<usize>> {
        let transition = self.settled.set(page)?;
        self.activation += 1;
        info!(
            previous = transition.previous,
            page = transition.next,
            "page settled"
        );
        PAGE_CHANGES.inc();
        self.events
            .push_back(PlayerEvent::PageChanged { index: page });
        Some(transition)
    }

    /// Rescales offsets to a new page width, keeping the fractional page
    /// position.
    pub fn set_page_width(&mut self, width: f32) {
        if !(width.is_finite() && width > 0.0) || width == self.page_width {
            return;
        }
        let scale = width / self.page_width;
        self.offset *= scale;
        self.saved_offset *= scale;
        self.page_width = width;
        if let Some(target) = self.pending_target {
            let velocity = self.spring.as_ref().map_or(0.0, Spring::velocity) * scale;
            self.spring = Some(Spring::new(
                self.offset,
                velocity,
                -(target as f32) * width,
                &self.spring_config,
            ));
        }
    }
}
