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

//! Continuously readable values for the host's renderer.

use serde::Serialize;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    /// Fractional page position, `-offset / page_width`, taken from the
    /// bounce-clamped offset.
    pub page_progress: f32,
    pub settled_page:  usize,
    pub is_paused:     bool,
    pub is_dragging:   bool,
    pub pages:         Vec<PageSignals>,
}

/// Per-page render inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSignals {
    pub index:               usize,
    /// `page_progress - index`, clamped to `[-1, 1]`. 0 when the page fills
    /// the viewport, positive while it slides out toward the left.
    pub transition_progress: f32,
    pub is_active:           bool,
    pub item_count:          usize,
    pub active_item:         usize,
    /// Item the progress indicator is drawn for. Follows `active_item` when
    /// the autoplay timer restarts.
    pub observed_item:       usize,
    pub timer_progress:      f32,
}

impl RenderSnapshot {
    pub fn page(&self, index: usize) -> Option<&PageSignals> { self.pages.get(index) }

    /// Signals of the settled page.
    pub fn active_page(&self) -> Option<&PageSignals> { self.pages.get(self.settled_page) }
}

impl PageSignals {
    /// Indicator fill for every item segment of the page.
    pub fn segment_fills(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.item_count).map(|item| segment_fill(item, self.observed_item, self.timer_progress))
    }
}

/// Transition progress of `page` for a pager at `page_progress`.
pub fn transition_progress(page_progress: f32, page: usize) -> f32 {
    (page_progress - page as f32).clamp(-1.0, 1.0)
}

/// Fill of one progress-indicator segment: earlier items are full, the
/// observed item shows the timer progress, later items are empty.
pub fn segment_fill(item: usize, observed_item: usize, progress: f32) -> f32 {
    match item.cmp(&observed_item) {
        std::cmp::Ordering::Less => 1.0,
        std::cmp::Ordering::Equal => progress.clamp(0.0, 1.0),
        std::cmp::Ordering::Greater => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_fill_up_to_the_observed_item() {
        let page = PageSignals {
            index:               0,
            transition_progress: 0.0,
            is_active:           true,
            item_count:          4,
            active_item:         2,
            observed_item:       2,
            timer_progress:      0.3,
        };
        assert_eq!(page.segment_fills().collect::<Vec<_>>(), vec![1.0, 1.0, 0.3, 0.0]);
        assert_eq!(segment_fill(0, 0, 1.7), 1.0);
    }

    #[test]
    fn transition_progress_is_clamped() {
        assert_eq!(transition_progress(1.25, 1), 0.25);
        assert_eq!(transition_progress(1.25, 2), -0.75);
        assert_eq!(transition_progress(0.0, 3), -1.0);
        assert_eq!(transition_progress(3.0, 0), 1.0);
    }
}
