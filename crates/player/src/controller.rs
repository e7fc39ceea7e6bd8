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

//! Session root: wires gestures, pager, carousels, pause and the autoplay
//! timer into one consistent state.
//!
//! The controller is the single writer of every piece of session state. All
//! mutation happens inside its methods; observers only ever receive events
//! after the fact, in the order they were raised.

use std::{collections::VecDeque, time::Duration};

use snafu::ensure;
use tracing::{debug, info, trace};

use crate::{
    carousel::{CarouselStep, ItemCarousel, PagedListView},
    config::PlayerConfig,
    err::{ConfigError, InitialPageOutOfRangeSnafu, NoPagesSnafu, Result},
    gesture::{GestureEvent, PointerEvent, PointerRecognizer},
    model::{Item, Page},
    observe::{ObserverSet, PlayerEvent, PlayerObserver},
    pager::{DragUpdate, PagePager, PageRequest},
    pause::{PauseCoordinator, PauseEdge},
    render::{PageSignals, RenderSnapshot, transition_progress},
    timer::{AutoplayTimer, ResumeOutcome, RunOwner, TimerPhase},
};

/// A running stories session over pages of `T` payloads.
pub struct PlayerController<T> {
    config:         PlayerConfig,
    pages:          Vec<Page<T>>,
    pager:          PagePager,
    carousels:      Vec<ItemCarousel>,
    pause:          PauseCoordinator,
    timer:          AutoplayTimer,
    recognizer:     PointerRecognizer,
    observed_items: Vec<usize>,
    observers:      ObserverSet,
    outbox:         VecDeque<PlayerEvent>,
    clock:          Duration,
}

impl<T> std::fmt::Debug for PlayerController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("pages", &self.pages.len())
            .field("pager", &self.pager)
            .field("pause", &self.pause)
            .field("timer", &self.timer)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

fn validate_session<T>(pages: &[Page<T>], config: &PlayerConfig) -> Result<(), ConfigError> {
    config.validate()?;
    ensure!(!pages.is_empty(), NoPagesSnafu);
    ensure!(
        config.initial_page_index < pages.len(),
        InitialPageOutOfRangeSnafu {
            index:      config.initial_page_index,
            page_count: pages.len(),
        }
    );
    for (index, page) in pages.iter().enumerate() {
        page.validate(index)?;
    }
    Ok(())
}

impl<T> PlayerController<T> {
    /// Validates the session and settles on the initial page with its
    /// autoplay timer running.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidConfiguration`] for an empty session, an
    /// empty page, a zero item duration, an out-of-range initial index or a
    /// bad numeric setting.
    pub fn new(pages: Vec<Page<T>>, config: PlayerConfig) -> Result<Self> {
        validate_session(&pages, &config)?;

        let pager = PagePager::new(pages.len(), &config);
        let carousels: Vec<_> = pages
            .iter()
            .enumerate()
            .map(|(index, page)| ItemCarousel::new(index, page.len(), page.initial_item()))
            .collect();
        let observed_items = carousels.iter().map(ItemCarousel::active_item_index).collect();

        let mut controller = Self {
            pause: PauseCoordinator::new(&config.autoplay),
            timer: AutoplayTimer::new(),
            recognizer: PointerRecognizer::new(&config.gesture),
            observers: ObserverSet::default(),
            outbox: VecDeque::new(),
            clock: Duration::ZERO,
            pager,
            carousels,
            observed_items,
            pages,
            config,
        };
        info!(
            pages = controller.pages.len(),
            initial_page = controller.pager.settled_page_index(),
            "player session created"
        );
        controller.restart_timer();
        Ok(controller)
    }

    /// Registers an observer. Observers are notified in registration order.
    pub fn subscribe(&mut self, observer: Box<dyn PlayerObserver>) { self.observers.push(observer); }

    /// Attaches the host list for `page`. Returns `false` for an unknown page.
    pub fn attach_list(&mut self, page: usize, list: Box<dyn PagedListView>) -> bool {
        let Some(carousel) = self.carousels.get_mut(page) else {
            return false;
        };
        carousel.attach_list(list);
        true
    }

    pub const fn config(&self) -> &PlayerConfig { &self.config }

    pub fn pages(&self) -> &[Page<T>] { &self.pages }

    pub const fn pager(&self) -> &PagePager { &self.pager }

    pub const fn pause(&self) -> &PauseCoordinator { &self.pause }

    pub const fn timer(&self) -> &AutoplayTimer { &self.timer }

    pub fn page_count(&self) -> usize { self.pages.len() }

    pub const fn settled_page_index(&self) -> usize { self.pager.settled_page_index() }

    pub const fn current_offset(&self) -> f32 { self.pager.current_offset() }

    pub fn page_progress(&self) -> f32 { self.pager.page_progress() }

    pub const fn is_paused(&self) -> bool { self.pause.is_paused() }

    /// Time accumulated through [`tick`](Self::tick). Pointer timestamps are
    /// read on this clock.
    pub const fn elapsed(&self) -> Duration { self.clock }

    pub fn active_item_index(&self, page: usize) -> Option<usize> {
        self.carousels.get(page).map(ItemCarousel::active_item_index)
    }

    pub fn observed_item_index(&self, page: usize) -> Option<usize> {
        self.observed_items.get(page).copied()
    }

    pub fn timer_progress(&self, page: usize) -> f32 { self.timer.progress_for(page) }

    /// Item currently shown on the settled page.
    pub fn active_item(&self) -> Option<&Item<T>> {
        let page = self.pager.settled_page_index();
        self.pages.get(page)?.item(self.carousels.get(page)?.active_item_index())
    }

    /// Feeds one recognized gesture.
    pub fn handle_gesture(&mut self, event: GestureEvent) {
        self.apply_gesture(event);
        self.flush();
    }

    /// Feeds one raw pointer sample through the built-in recognizer.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        for gesture in self.recognizer.handle(event) {
            self.apply_gesture(gesture);
        }
        self.flush();
    }

    /// Tap at `x` within the settled page.
    pub fn tap(&mut self, x: f32) {
        self.apply_tap(x);
        self.flush();
    }

    /// Moves `delta` pages from the settled page.
    pub fn request_page_change(&mut self, delta: isize) -> PageRequest {
        let request = self.pager.request_page_change(delta);
        self.after_page_request(request);
        self.flush();
        request
    }

    /// Moves to the absolute page `index`.
    pub fn set_page_index(&mut self, index: isize) -> PageRequest {
        let request = self.pager.set_page_index(index);
        self.after_page_request(request);
        self.flush();
        request
    }

    /// Applies a new viewport width. Non-positive widths are ignored.
    pub fn resize(&mut self, width: f32) {
        if !(width.is_finite() && width > 0.0) {
            debug!(width, "ignoring invalid page width");
            return;
        }
        self.pager.set_page_width(width);
        self.config.page_width = width;
    }

    /// Advances time: long-press recognition, the autoplay ramp and the
    /// settle spring, in that order.
    pub fn tick(&mut self, dt: Duration) {
        self.clock += dt;
        for gesture in self.recognizer.poll(self.clock) {
            self.apply_gesture(gesture);
        }

        if let Some(owner) = self.timer.tick(dt) {
            self.on_autoplay_completed(owner);
        }

        let was_settling = self.pager.is_settling();
        if let Some(transition) = self.pager.tick(dt) {
            let page = transition.next;
            // Observers see the new index before the new page's timer starts.
            self.flush();
            self.observed_items[page] = self.carousels[page].active_item_index();
            self.restart_timer();
        } else if was_settling && !self.pager.is_settling() && self.timer.phase() == TimerPhase::Idle
        {
            // Spring came back to the page it left from.
            self.restart_timer();
        }
        self.flush();
    }

    /// Render inputs for the current frame.
    pub fn snapshot(&self) -> RenderSnapshot {
        let page_progress = self.pager.page_progress();
        let settled_page = self.pager.settled_page_index();
        let pages = self
            .carousels
            .iter()
            .zip(&self.observed_items)
            .map(|(carousel, &observed_item)| {
                let index = carousel.page();
                PageSignals {
                    index,
                    transition_progress: transition_progress(page_progress, index),
                    is_active: index == settled_page,
                    item_count: carousel.item_count(),
                    active_item: carousel.active_item_index(),
                    observed_item,
                    timer_progress: self.timer.progress_for(index),
                }
            })
            .collect();
        RenderSnapshot {
            page_progress,
            settled_page,
            is_paused: self.pause.is_paused(),
            is_dragging: self.pager.is_dragging(),
            pages,
        }
    }

    fn apply_gesture(&mut self, event: GestureEvent) {
        trace!(%event, "gesture");
        match event {
            GestureEvent::DragBegin => self.pager.begin_drag(),
            GestureEvent::DragUpdate { translation_x, .. } => {
                if self.pager.update_drag(translation_x) == DragUpdate::Activated {
                    let edge = self.pause.set_drag_active(true);
                    self.apply_pause_edge(edge);
                }
            }
            GestureEvent::DragEnd { velocity_x } => {
                let target = self.pager.end_drag(velocity_x);
                self.after_drag(target);
            }
            GestureEvent::DragCancel => {
                let target = self.pager.cancel_drag();
                self.after_drag(target);
            }
            GestureEvent::LongPressBegin => self.pause.long_press_begin(),
            GestureEvent::LongPressStart => {
                let edge = self.pause.long_press_start();
                self.apply_pause_edge(edge);
            }
            GestureEvent::LongPressEnd => {
                let edge = self.pause.long_press_end();
                self.apply_pause_edge(edge);
            }
            GestureEvent::Tap { x } => self.apply_tap(x),
        }
    }

    fn after_drag(&mut self, target: Option<usize>) {
        // A touch that never became a drag never raised the drag source.
        if target.is_none() {
            return;
        }
        self.discard_timer_if_leaving();
        let edge = self.pause.set_drag_active(false);
        self.apply_pause_edge(edge);
    }

    fn apply_tap(&mut self, x: f32) {
        let page = self.pager.settled_page_index();
        let width = self.pager.page_width();
        let step = self.carousels[page].on_tap_zone(x, width, &self.pause, &mut self.pager);
        self.apply_step(page, step);
    }

    fn apply_step(&mut self, page: usize, step: CarouselStep) {
        match step {
            CarouselStep::Moved { to, .. } => {
                self.emit(PlayerEvent::ActiveItemChanged { page, item: to });
                if page == self.pager.settled_page_index() {
                    self.restart_timer();
                }
            }
            CarouselStep::PageRequested {
                delta,
                request: PageRequest::Accepted { target },
            } => {
                // Going backwards continues from the end of the previous page.
                if delta < 0 && self.carousels[target].jump_to_last().is_some() {
                    let item = self.carousels[target].active_item_index();
                    self.emit(PlayerEvent::ActiveItemChanged { page: target, item });
                }
                self.discard_timer_if_leaving();
            }
            CarouselStep::PageRequested { .. } | CarouselStep::Suppressed | CarouselStep::NoOp => {}
        }
    }

    fn after_page_request(&mut self, request: PageRequest) {
        if matches!(request, PageRequest::Accepted { .. }) {
            self.discard_timer_if_leaving();
        }
    }

    fn apply_pause_edge(&mut self, edge: Option<PauseEdge>) {
        match edge {
            Some(PauseEdge::Began) => {
                self.emit(PlayerEvent::PauseBegan);
                self.timer.pause();
            }
            Some(PauseEdge::Ended) => {
                self.emit(PlayerEvent::PauseEnded);
                if self.pager.is_leaving_settled_page() {
                    // The new page's timer starts when the spring settles.
                    return;
                }
                let page = self.pager.settled_page_index();
                if self.timer.resume(page, self.pager.activation()) == ResumeOutcome::Stale {
                    self.restart_timer();
                }
            }
            None => {}
        }
    }

    fn on_autoplay_completed(&mut self, owner: RunOwner) {
        self.emit(PlayerEvent::AutoplayCompleted {
            page: owner.page,
            item: owner.item,
        });
        let still_active = owner.page == self.pager.settled_page_index()
            && owner.activation == self.pager.activation()
            && !self.pager.is_leaving_settled_page();
        if !still_active {
            debug!(%owner, "completion for inactive page ignored");
            return;
        }
        let step = self.carousels[owner.page].advance(&mut self.pager);
        self.apply_step(owner.page, step);
    }

    fn discard_timer_if_leaving(&mut self) {
        if self.pager.is_leaving_settled_page() && self.timer.phase() != TimerPhase::Idle {
            trace!(pending = ?self.pager.pending_target(), "discarding timer of departing page");
            self.timer.reset();
        }
    }

    /// Starts a fresh run for the settled page's active item.
    fn restart_timer(&mut self) {
        let page = self.pager.settled_page_index();
        let item = self.carousels[page].active_item_index();
        self.observed_items[page] = item;
        if !self.config.autoplay.enabled {
            self.timer.reset();
            return;
        }
        let Some(duration) = self.pages[page].duration_of(item) else {
            self.timer.reset();
            return;
        };
        let owner = RunOwner {
            page,
            item,
            activation: self.pager.activation(),
        };
        self.timer.start(owner, duration);
        if self.pause.is_paused() {
            self.timer.pause();
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.outbox.extend(self.pager.drain_events());
        self.outbox.push_back(event);
    }

    fn flush(&mut self) {
        self.outbox.extend(self.pager.drain_events());
        while let Some(event) = self.outbox.pop_front() {
            self.observers.notify(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{err::Error, observe::FnObserver};

    const FRAME: Duration = Duration::from_millis(16);

    fn pages(counts: &[usize]) -> Vec<Page<usize>> {
        counts
            .iter()
            .map(|&n| Page::uniform(0..n, Duration::from_secs(1)))
            .collect()
    }

    fn controller(counts: &[usize]) -> (PlayerController<usize>, Arc<Mutex<Vec<PlayerEvent>>>) {
        let config = PlayerConfig::builder().page_width(300.0).build();
        let mut controller = PlayerController::new(pages(counts), config).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        controller.subscribe(Box::new(FnObserver(move |event: &PlayerEvent| {
            sink.lock().unwrap().push(*event);
        })));
        (controller, events)
    }

    fn run(controller: &mut PlayerController<usize>, duration: Duration) {
        let frames = duration.as_millis() / FRAME.as_millis();
        for _ in 0..frames {
            controller.tick(FRAME);
        }
    }

    #[test]
    fn construction_rejects_bad_sessions() {
        let empty: Vec<Page<usize>> = Vec::new();
        assert!(matches!(
            PlayerController::new(empty, PlayerConfig::default()),
            Err(Error::InvalidConfiguration {
                source: ConfigError::NoPages { .. },
                ..
            })
        ));

        let config = PlayerConfig::builder().initial_page_index(2).build();
        assert!(matches!(
            PlayerController::new(pages(&[1, 1]), config),
            Err(Error::InvalidConfiguration {
                source: ConfigError::InitialPageOutOfRange { index: 2, page_count: 2, .. },
                ..
            })
        ));

        let err = PlayerController::new(pages(&[2, 0]), PlayerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("page 1 has no items"), "{err}");
    }

    #[test]
    fn initial_timer_runs_on_initial_page() {
        let (c, _) = controller(&[2, 2]);
        assert_eq!(c.timer().phase(), TimerPhase::Running);
        assert_eq!(c.timer().owner().map(|o| (o.page, o.item)), Some((0, 0)));
    }

    #[test]
    fn autoplay_walks_items_then_pages() {
        let (mut c, events) = controller(&[2, 1]);
        run(&mut c, Duration::from_millis(1024));
        assert_eq!(c.active_item_index(0), Some(1));
        assert_eq!(c.observed_item_index(0), Some(1));

        run(&mut c, Duration::from_millis(2000));
        assert_eq!(c.settled_page_index(), 1);
        let events = events.lock().unwrap();
        let page_changed = events
            .iter()
            .position(|e| *e == PlayerEvent::PageChanged { index: 1 })
            .unwrap();
        assert_eq!(events[..page_changed], [
            PlayerEvent::AutoplayCompleted { page: 0, item: 0 },
            PlayerEvent::ActiveItemChanged { page: 0, item: 1 },
            PlayerEvent::AutoplayCompleted { page: 0, item: 1 },
        ]);
        assert_eq!(c.timer().owner().map(|o| o.page), Some(1));
    }

    #[test]
    fn last_item_of_last_page_stops() {
        let (mut c, events) = controller(&[1]);
        run(&mut c, Duration::from_millis(1200));
        assert_eq!(c.timer().phase(), TimerPhase::Completed);
        assert_eq!(c.timer_progress(0), 1.0);
        assert!(events.lock().unwrap().contains(&PlayerEvent::ReachedLastPage));
    }

    #[test]
    fn tap_restarts_timer_for_new_item() {
        let (mut c, _) = controller(&[3]);
        run(&mut c, Duration::from_millis(480));
        assert!(c.timer_progress(0) > 0.4);
        c.tap(290.0);
        assert_eq!(c.active_item_index(0), Some(1));
        assert_eq!(c.timer_progress(0), 0.0);
        assert_eq!(c.timer().owner().map(|o| o.item), Some(1));
    }

    #[test]
    fn long_press_pauses_and_resumes_remaining_time() {
        let (mut c, _) = controller(&[2]);
        run(&mut c, Duration::from_millis(400));
        c.handle_gesture(GestureEvent::LongPressBegin);
        c.handle_gesture(GestureEvent::LongPressStart);
        assert!(c.is_paused());
        let held = c.timer_progress(0);
        run(&mut c, Duration::from_secs(5));
        assert_eq!(c.timer_progress(0), held);

        c.handle_gesture(GestureEvent::LongPressEnd);
        assert!(!c.is_paused());
        assert_eq!(c.timer().phase(), TimerPhase::Running);
        assert!((c.timer().remaining().as_secs_f32() - (1.0 - held)).abs() < 1e-3);
    }

    #[test]
    fn disabled_autoplay_never_starts() {
        let config = PlayerConfig::builder()
            .autoplay(crate::config::AutoplayConfig::builder().enabled(false).build())
            .build();
        let mut c = PlayerController::new(pages(&[2]), config).unwrap();
        run(&mut c, Duration::from_secs(3));
        assert_eq!(c.timer().phase(), TimerPhase::Idle);
        assert_eq!(c.active_item_index(0), Some(0));
    }

    #[test]
    fn snapshot_reports_render_inputs() {
        let (mut c, _) = controller(&[2, 3]);
        run(&mut c, Duration::from_millis(496));
        let snapshot = c.snapshot();
        assert_eq!(snapshot.settled_page, 0);
        assert_eq!(snapshot.pages.len(), 2);
        assert!(snapshot.pages[0].is_active);
        assert!(snapshot.pages[0].timer_progress > 0.4);
        assert_eq!(snapshot.pages[1].timer_progress, 0.0);
        assert_eq!(snapshot.pages[1].transition_progress, -1.0);
    }

    #[test]
    fn pointer_samples_drive_the_session() {
        let (mut c, events) = controller(&[1, 1]);
        let at = c.elapsed();
        c.handle_pointer(PointerEvent::Down { x: 250.0, y: 0.0, at });
        c.handle_pointer(PointerEvent::Move { x: 150.0, y: 0.0, at: at + FRAME });
        assert!(c.is_paused());
        c.handle_pointer(PointerEvent::Up { x: 50.0, y: 0.0, at: at + 2 * FRAME });
        assert!(!c.is_paused());
        run(&mut c, Duration::from_millis(800));
        assert_eq!(c.settled_page_index(), 1);
        assert!(events.lock().unwrap().contains(&PlayerEvent::PageChanged { index: 1 }));
    }

    #[test]
    fn resize_keeps_the_page() {
        let (mut c, _) = controller(&[1, 1]);
        c.set_page_index(1);
        run(&mut c, Duration::from_millis(800));
        c.resize(600.0);
        assert_eq!(c.current_offset(), -600.0);
        c.resize(-1.0);
        assert_eq!(c.config().page_width, 600.0);
    }
}
