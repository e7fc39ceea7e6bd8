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

//! Per-page item carousel and its tap zones.

use derive_more::Display;
use strum_macros::{EnumIter, IntoStaticStr};
use tracing::{debug, trace};

use crate::{
    metrics::ITEM_JUMPS,
    pager::{PagePager, PageRequest},
    pause::PauseCoordinator,
};

/// Host-side list that renders a page's items.
///
/// The carousel only ever asks it to show an index, without animation.
pub trait PagedListView: Send {
    fn jump_to_index(&mut self, index: usize);
}

/// Horizontal thirds of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TapZone {
    /// Left third: previous item.
    Retreat,
    /// Middle third: nothing.
    Middle,
    /// Right third: next item.
    Advance,
}

impl TapZone {
    /// Zone for a tap at `x` on a page `width` wide. Positions outside the
    /// page fall into the nearest edge zone.
    pub fn from_position(x: f32, width: f32) -> Self {
        let third = width / 3.0;
        if x < third {
            Self::Retreat
        } else if x < 2.0 * third {
            Self::Middle
        } else {
            Self::Advance
        }
    }
}

/// What a carousel operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselStep {
    /// The active item changed.
    Moved { from: usize, to: usize },
    /// The carousel was at an edge and handed off to the pager.
    PageRequested { delta: isize, request: PageRequest },
    /// Tap ignored because a long press is held.
    Suppressed,
    /// Nothing happened.
    NoOp,
}

/// Active item index of one page.
pub struct ItemCarousel {
    page:       usize,
    item_count: usize,
    active:     usize,
    list:       Option<Box<dyn PagedListView>>,
}

impl std::fmt::Debug for ItemCarousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemCarousel")
            .field("page", &self.page)
            .field("item_count", &self.item_count)
            .field("active", &self.active)
            .field("list", &self.list.is_some())
            .finish()
    }
}

impl ItemCarousel {
    /// `initial` is clamped into the page.
    pub fn new(page: usize, item_count: usize, initial: usize) -> Self {
        Self {
            page,
            item_count,
            active: initial.min(item_count.saturating_sub(1)),
            list: None,
        }
    }

    pub const fn page(&self) -> usize { self.page }

    pub const fn item_count(&self) -> usize { self.item_count }

    pub const fn active_item_index(&self) -> usize { self.active }

    /// Attaches the host list and brings it to the active item.
    pub fn attach_list(&mut self, mut list: Box<dyn PagedListView>) {
        list.jump_to_index(self.active);
        self.list = Some(list);
    }

    pub fn detach_list(&mut self) -> Option<Box<dyn PagedListView>> { self.list.take() }

    /// Handles a tap at `x` on a page `width` wide.
    ///
    /// Only the settled page reacts, and nothing reacts while a long press is
    /// held.
    pub fn on_tap_zone(
        &mut self,
        x: f32,
        width: f32,
        pause: &PauseCoordinator,
        pager: &mut PagePager,
    ) -> CarouselStep {
        if pause.suppresses_taps() {
            trace!(page = self.page, x, "tap suppressed during long press");
            return CarouselStep::Suppressed;
        }
        if pager.settled_page_index() != self.page {
            return CarouselStep::NoOp;
        }
        match TapZone::from_position(x, width) {
            TapZone::Retreat => self.retreat(pager),
            TapZone::Middle => CarouselStep::NoOp,
            TapZone::Advance => self.advance(pager),
        }
    }

    /// Next item, or the next page when already on the last item.
    pub fn advance(&mut self, pager: &mut PagePager) -> CarouselStep {
        if self.active + 1 < self.item_count {
            let from = self.active;
            self.show(from + 1, "advance");
            return CarouselStep::Moved {
                from,
                to: self.active,
            };
        }
        debug!(page = self.page, "last item, requesting next page");
        CarouselStep::PageRequested {
            delta:   1,
            request: pager.request_page_change(1),
        }
    }

    /// Previous item, or the previous page when already on the first item.
    pub fn retreat(&mut self, pager: &mut PagePager) -> CarouselStep {
        if self.active > 0 {
            let from = self.active;
            self.show(from - 1, "retreat");
            return CarouselStep::Moved {
                from,
                to: self.active,
            };
        }
        debug!(page = self.page, "first item, requesting previous page");
        CarouselStep::PageRequested {
            delta:   -1,
            request: pager.request_page_change(-1),
        }
    }

    /// Shows `index` directly. Returns the previous index when it changed;
    /// out-of-range indexes are ignored.
    pub fn jump_to(&mut self, index: usize) -> Option<usize> {
        if index >= self.item_count || index == self.active {
            return None;
        }
        let from = self.active;
        self.show(index, "jump");
        Some(from)
    }

    /// Shows the last item.
    pub fn jump_to_last(&mut self) -> Option<usize> { self.jump_to(self.item_count.saturating_sub(1)) }

    fn show(&mut self, index: usize, cause: &'static str) {
        trace!(page = self.page, from = self.active, to = index, cause, "active item moved");
        self.active = index;
        ITEM_JUMPS.with_label_values(&[cause]).inc();
        if let Some(list) = self.list.as_mut() {
            list.jump_to_index(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use strum::IntoEnumIterator;

    use super::*;
    use crate::config::{AutoplayConfig, PlayerConfig};

    struct RecordingList(Arc<Mutex<Vec<usize>>>);

    impl PagedListView for RecordingList {
        fn jump_to_index(&mut self, index: usize) { self.0.lock().unwrap().push(index); }
    }

    fn pager(pages: usize, initial: usize) -> PagePager {
        let config = PlayerConfig::builder()
            .page_width(300.0)
            .initial_page_index(initial)
            .build();
        PagePager::new(pages, &config)
    }

    fn idle() -> PauseCoordinator { PauseCoordinator::new(&AutoplayConfig::default()) }

    #[test]
    fn zones_split_the_page_in_thirds() {
        assert_eq!(TapZone::from_position(0.0, 300.0), TapZone::Retreat);
        assert_eq!(TapZone::from_position(99.9, 300.0), TapZone::Retreat);
        assert_eq!(TapZone::from_position(100.0, 300.0), TapZone::Middle);
        assert_eq!(TapZone::from_position(199.9, 300.0), TapZone::Middle);
        assert_eq!(TapZone::from_position(200.0, 300.0), TapZone::Advance);
        assert_eq!(TapZone::from_position(-5.0, 300.0), TapZone::Retreat);
        assert_eq!(TapZone::from_position(500.0, 300.0), TapZone::Advance);
        assert_eq!(TapZone::iter().count(), 3);
    }

    #[test]
    fn taps_move_within_the_page() {
        let mut pager = pager(2, 0);
        let mut carousel = ItemCarousel::new(0, 3, 0);
        let pause = idle();

        assert_eq!(
            carousel.on_tap_zone(250.0, 300.0, &pause, &mut pager),
            CarouselStep::Moved { from: 0, to: 1 }
        );
        assert_eq!(
            carousel.on_tap_zone(150.0, 300.0, &pause, &mut pager),
            CarouselStep::NoOp
        );
        assert_eq!(
            carousel.on_tap_zone(10.0, 300.0, &pause, &mut pager),
            CarouselStep::Moved { from: 1, to: 0 }
        );
        assert!(!pager.is_settling());
    }

    #[test]
    fn edges_hand_off_to_the_pager() {
        let mut pager = pager(3, 1);
        let mut carousel = ItemCarousel::new(1, 2, 1);
        assert_eq!(carousel.advance(&mut pager), CarouselStep::PageRequested {
            delta:   1,
            request: PageRequest::Accepted { target: 2 },
        });
        assert_eq!(carousel.active_item_index(), 1);

        let mut pager = self::pager(3, 0);
        let mut first = ItemCarousel::new(0, 2, 0);
        assert_eq!(first.retreat(&mut pager), CarouselStep::PageRequested {
            delta:   -1,
            request: PageRequest::ReachedFirstPage,
        });
        assert_eq!(first.active_item_index(), 0);
    }

    #[test]
    fn long_press_suppresses_taps() {
        let mut pager = pager(2, 0);
        let mut carousel = ItemCarousel::new(0, 3, 0);
        let mut pause = idle();
        pause.long_press_start();
        assert_eq!(
            carousel.on_tap_zone(250.0, 300.0, &pause, &mut pager),
            CarouselStep::Suppressed
        );
        assert_eq!(carousel.active_item_index(), 0);
    }

    #[test]
    fn only_the_settled_page_reacts() {
        let mut pager = pager(2, 0);
        let mut other = ItemCarousel::new(1, 3, 0);
        assert_eq!(
            other.on_tap_zone(250.0, 300.0, &idle(), &mut pager),
            CarouselStep::NoOp
        );
    }

    #[test]
    fn list_follows_the_active_item() {
        let jumps = Arc::new(Mutex::new(Vec::new()));
        let mut pager = pager(1, 0);
        let mut carousel = ItemCarousel::new(0, 4, 1);
        carousel.attach_list(Box::new(RecordingList(Arc::clone(&jumps))));

        carousel.advance(&mut pager);
        assert_eq!(carousel.jump_to_last(), Some(2));
        assert_eq!(carousel.jump_to(9), None);
        assert_eq!(carousel.jump_to(3), None);
        assert_eq!(*jumps.lock().unwrap(), vec![1, 2, 3]);
        assert!(carousel.detach_list().is_some());
    }
}
