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

//! Gesture events consumed by the player, and a recognizer that derives them
//! from raw pointer samples.

use std::{collections::VecDeque, time::Duration};

use derive_more::Display;
use tracing::trace;

use crate::config::GestureConfig;

/// Recognized gesture input.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum GestureEvent {
    /// Touch down on the pager. Drags are measured from the offset at this
    /// point.
    #[display("drag begin")]
    DragBegin,
    /// Horizontal travel since `DragBegin`, and the pointer's x within the
    /// page.
    #[display("drag update {translation_x}")]
    DragUpdate { translation_x: f32, page_x: f32 },
    /// Release with horizontal velocity in px/s.
    #[display("drag end {velocity_x}")]
    DragEnd { velocity_x: f32 },
    #[display("drag cancel")]
    DragCancel,
    /// Press down that may become a long press.
    #[display("long press begin")]
    LongPressBegin,
    /// Hold time and travel thresholds satisfied.
    #[display("long press start")]
    LongPressStart,
    #[display("long press end")]
    LongPressEnd,
    /// Touch that was neither a drag nor a long press.
    #[display("tap {x}")]
    Tap { x: f32 },
}

/// Raw pointer sample. `at` is measured on the same clock the player is
/// ticked with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32, at: Duration },
    Move { x: f32, y: f32, at: Duration },
    Up { x: f32, y: f32, at: Duration },
    Cancel { at: Duration },
}

/// Window of recent samples used for release velocity.
const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LongPress {
    Armed,
    Started,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    x:  f32,
    at: Duration,
}

#[derive(Debug, Clone)]
struct Press {
    origin_x:   f32,
    origin_y:   f32,
    down_at:    Duration,
    dragging:   bool,
    long_press: LongPress,
    samples:    VecDeque<Sample>,
}

impl Press {
    fn travel(&self, x: f32, y: f32) -> f32 { (x - self.origin_x).hypot(y - self.origin_y) }

    fn record(&mut self, x: f32, at: Duration) {
        self.samples.push_back(Sample { x, at });
        while self
            .samples
            .front()
            .is_some_and(|s| at.saturating_sub(s.at) > VELOCITY_WINDOW)
        {
            self.samples.pop_front();
        }
    }

    fn velocity(&self) -> f32 {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let dt = last.at.saturating_sub(first.at).as_secs_f32();
        if dt <= 0.0 {
            return 0.0;
        }
        (last.x - first.x) / dt
    }
}

/// Turns pointer samples into [`GestureEvent`]s.
///
/// Every press yields `DragBegin` and `LongPressBegin` on touch down, then
/// `DragUpdate` for every move. A long press starts once the pointer has
/// been held for the minimum duration without travelling further than the
/// maximum distance; this is checked on moves and on [`poll`](Self::poll).
/// On release the recognizer emits `LongPressEnd` (if a long press was
/// begun), a last `DragUpdate` when a drag released away from its previous
/// sample, `DragEnd`, and finally `Tap` when the press was neither a drag nor
/// a long press.
#[derive(Debug, Clone)]
pub struct PointerRecognizer {
    min_distance:        f32,
    long_press_duration: Duration,
    long_press_distance: f32,
    press:               Option<Press>,
}

impl PointerRecognizer {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            min_distance:        config.min_distance,
            long_press_duration: config.long_press_min_duration(),
            long_press_distance: config.long_press_max_distance,
            press:               None,
        }
    }

    pub const fn is_pressed(&self) -> bool { self.press.is_some() }

    pub fn handle(&mut self, event: PointerEvent) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        match event {
            PointerEvent::Down { x, y, at } => {
                if self.press.is_some() {
                    // A second down without an up: close the stale press.
                    self.cancel(&mut out);
                }
                let mut press = Press {
                    origin_x: x,
                    origin_y: y,
                    down_at: at,
                    dragging: false,
                    long_press: LongPress::Armed,
                    samples: VecDeque::new(),
                };
                press.record(x, at);
                self.press = Some(press);
                out.push(GestureEvent::DragBegin);
                out.push(GestureEvent::LongPressBegin);
            }
            PointerEvent::Move { x, y, at } => {
                let Some(press) = self.press.as_mut() else {
                    return out;
                };
                press.record(x, at);
                let translation_x = x - press.origin_x;
                if !press.dragging && translation_x.abs() >= self.min_distance {
                    trace!(translation_x, "press became a drag");
                    press.dragging = true;
                }
                if press.long_press == LongPress::Armed
                    && press.travel(x, y) > self.long_press_distance
                {
                    press.long_press = LongPress::Failed;
                    out.push(GestureEvent::LongPressEnd);
                }
                self.check_long_press(at, &mut out);
                out.push(GestureEvent::DragUpdate {
                    translation_x,
                    page_x: x,
                });
            }
            PointerEvent::Up { x, at, .. } => {
                self.check_long_press(at, &mut out);
                let Some(mut press) = self.press.take() else {
                    return out;
                };
                let moved = press.samples.back().is_none_or(|last| last.x != x);
                press.record(x, at);
                let translation_x = x - press.origin_x;
                press.dragging |= translation_x.abs() >= self.min_distance;
                let long_pressed = press.long_press == LongPress::Started;
                if press.long_press != LongPress::Failed {
                    out.push(GestureEvent::LongPressEnd);
                }
                if press.dragging && moved {
                    // The release point may be the only sample past the slop.
                    out.push(GestureEvent::DragUpdate {
                        translation_x,
                        page_x: x,
                    });
                }
                out.push(GestureEvent::DragEnd {
                    velocity_x: press.velocity(),
                });
                if !press.dragging && !long_pressed {
                    out.push(GestureEvent::Tap { x });
                }
            }
            PointerEvent::Cancel { .. } => self.cancel(&mut out),
        }
        out
    }

    /// Checks the long-press hold time without a new sample.
    pub fn poll(&mut self, now: Duration) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        self.check_long_press(now, &mut out);
        out
    }

    fn check_long_press(&mut self, now: Duration, out: &mut Vec<GestureEvent>) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        if press.long_press == LongPress::Armed
            && now.saturating_sub(press.down_at) >= self.long_press_duration
        {
            trace!(held = ?now.saturating_sub(press.down_at), "long press recognized");
            press.long_press = LongPress::Started;
            out.push(GestureEvent::LongPressStart);
        }
    }

    fn cancel(&mut self, out: &mut Vec<GestureEvent>) {
        let Some(press) = self.press.take() else {
            return;
        };
        if press.long_press != LongPress::Failed {
            out.push(GestureEvent::LongPressEnd);
        }
        out.push(GestureEvent::DragCancel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration { Duration::from_millis(value) }

    fn recognizer() -> PointerRecognizer { PointerRecognizer::new(&GestureConfig::default()) }

    #[test]
    fn quick_touch_is_a_tap() {
        let mut r = recognizer();
        assert_eq!(
            r.handle(PointerEvent::Down { x: 50.0, y: 10.0, at: ms(0) }),
            vec![GestureEvent::DragBegin, GestureEvent::LongPressBegin]
        );
        let up = r.handle(PointerEvent::Up { x: 52.0, y: 10.0, at: ms(80) });
        assert_eq!(up[0], GestureEvent::LongPressEnd);
        assert!(matches!(up[1], GestureEvent::DragEnd { .. }));
        assert_eq!(up[2], GestureEvent::Tap { x: 52.0 });
        assert!(!r.is_pressed());
    }

    #[test]
    fn horizontal_travel_becomes_a_drag() {
        let mut r = recognizer();
        r.handle(PointerEvent::Down { x: 300.0, y: 0.0, at: ms(0) });
        let moved = r.handle(PointerEvent::Move { x: 280.0, y: 0.0, at: ms(16) });
        assert_eq!(moved, vec![
            GestureEvent::LongPressEnd,
            GestureEvent::DragUpdate {
                translation_x: -20.0,
                page_x:        280.0,
            },
        ]);
        r.handle(PointerEvent::Move { x: 200.0, y: 0.0, at: ms(66) });
        let up = r.handle(PointerEvent::Up { x: 180.0, y: 0.0, at: ms(82) });
        let [GestureEvent::DragUpdate { translation_x, .. }, GestureEvent::DragEnd { velocity_x }] =
            up.as_slice()
        else {
            panic!("unexpected release events {up:?}");
        };
        assert_eq!(*translation_x, -120.0);
        assert!(*velocity_x < -1000.0, "velocity {velocity_x}");
    }

    #[test]
    fn swipe_with_only_down_and_up_is_a_drag() {
        let mut r = recognizer();
        r.handle(PointerEvent::Down { x: 280.0, y: 0.0, at: ms(0) });
        let up = r.handle(PointerEvent::Up { x: 40.0, y: 0.0, at: ms(16) });
        assert_eq!(up[0], GestureEvent::LongPressEnd);
        assert_eq!(up[1], GestureEvent::DragUpdate {
            translation_x: -240.0,
            page_x:        40.0,
        });
        let GestureEvent::DragEnd { velocity_x } = up[2] else {
            panic!("unexpected release events {up:?}");
        };
        assert!(velocity_x < -10_000.0, "velocity {velocity_x}");
        assert_eq!(up.len(), 3, "a swipe must not tap");
    }

    #[test]
    fn release_at_last_sample_adds_no_update() {
        let mut r = recognizer();
        r.handle(PointerEvent::Down { x: 300.0, y: 0.0, at: ms(0) });
        r.handle(PointerEvent::Move { x: 200.0, y: 0.0, at: ms(16) });
        let up = r.handle(PointerEvent::Up { x: 200.0, y: 0.0, at: ms(32) });
        assert!(matches!(up.as_slice(), [GestureEvent::DragEnd { .. }]), "{up:?}");
    }

    #[test]
    fn held_press_starts_long_press_on_poll() {
        let mut r = recognizer();
        r.handle(PointerEvent::Down { x: 10.0, y: 10.0, at: ms(0) });
        assert!(r.poll(ms(499)).is_empty());
        assert_eq!(r.poll(ms(500)), vec![GestureEvent::LongPressStart]);
        assert!(r.poll(ms(900)).is_empty());

        let up = r.handle(PointerEvent::Up { x: 12.0, y: 10.0, at: ms(1200) });
        assert_eq!(up[0], GestureEvent::LongPressEnd);
        assert!(
            !up.iter().any(|e| matches!(e, GestureEvent::Tap { .. })),
            "long press must not tap"
        );
    }

    #[test]
    fn wandering_press_never_long_presses() {
        let mut r = recognizer();
        r.handle(PointerEvent::Down { x: 10.0, y: 10.0, at: ms(0) });
        let moved = r.handle(PointerEvent::Move { x: 10.0, y: 40.0, at: ms(100) });
        assert_eq!(moved[0], GestureEvent::LongPressEnd);
        assert!(r.poll(ms(2000)).is_empty());
    }

    #[test]
    fn cancel_closes_both_streams() {
        let mut r = recognizer();
        r.handle(PointerEvent::Down { x: 10.0, y: 10.0, at: ms(0) });
        r.poll(ms(600));
        assert_eq!(r.handle(PointerEvent::Cancel { at: ms(700) }), vec![
            GestureEvent::LongPressEnd,
            GestureEvent::DragCancel,
        ]);
        assert!(r.handle(PointerEvent::Move { x: 0.0, y: 0.0, at: ms(710) }).is_empty());
    }
}
