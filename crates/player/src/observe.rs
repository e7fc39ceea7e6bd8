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

//! Observed state cells and the host-facing event surface.

use derive_more::Display;

/// A change reported by a [`Watched`] cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<T> {
    pub previous: T,
    pub next:     T,
}

/// A single owned value with at-most-once change reporting.
///
/// `set` compares against the last value it reported, not against whatever
/// was written last, so writing the same value twice (or writing A, B, A
/// before anyone reads) never produces a duplicate notification.
#[derive(Debug, Clone)]
pub struct Watched<T> {
    last_emitted: T,
}

impl<T: Copy + PartialEq> Watched<T> {
    /// Creates a cell whose initial value counts as already reported.
    pub const fn new(initial: T) -> Self {
        Self {
            last_emitted: initial,
        }
    }

    pub const fn get(&self) -> T { self.last_emitted }

    /// Stores `next`, returning the transition if it differs from the last
    /// reported value.
    pub fn set(&mut self, next: T) -> Option<Transition<T>> {
        if next == self.last_emitted {
            return None;
        }
        let previous = std::mem::replace(&mut self.last_emitted, next);
        Some(Transition { previous, next })
    }
}

/// Discrete events handed from the player to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PlayerEvent {
    /// The pager settled on a different page.
    #[display("page changed to {index}")]
    PageChanged { index: usize },
    /// A page change was requested before the first page.
    #[display("reached first page")]
    ReachedFirstPage,
    /// A page change was requested past the last page.
    #[display("reached last page")]
    ReachedLastPage,
    /// The active item of a page changed.
    #[display("page {page} active item {item}")]
    ActiveItemChanged { page: usize, item: usize },
    /// An autoplay run finished for the given item.
    #[display("autoplay completed on page {page} item {item}")]
    AutoplayCompleted { page: usize, item: usize },
    /// The combined pause signal rose.
    #[display("pause began")]
    PauseBegan,
    /// The combined pause signal fell.
    #[display("pause ended")]
    PauseEnded,
}

/// Receives player events on the host side.
///
/// Implement `on_event` to see everything, or override only the callbacks
/// you care about and keep the default dispatch.
pub trait PlayerObserver: Send {
    fn on_event(&mut self, event: &PlayerEvent) {
        match *event {
            PlayerEvent::PageChanged { index } => self.on_change_page_index(index),
            PlayerEvent::ReachedFirstPage => self.on_reached_first_page(),
            PlayerEvent::ReachedLastPage => self.on_reached_last_page(),
            PlayerEvent::ActiveItemChanged { page, item } => self.on_active_item_changed(page, item),
            PlayerEvent::PauseBegan => self.on_pause_changed(true),
            PlayerEvent::PauseEnded => self.on_pause_changed(false),
            PlayerEvent::AutoplayCompleted { .. } => {}
        }
    }

    fn on_change_page_index(&mut self, _index: usize) {}

    fn on_reached_first_page(&mut self) {}

    fn on_reached_last_page(&mut self) {}

    fn on_active_item_changed(&mut self, _page: usize, _item: usize) {}

    fn on_pause_changed(&mut self, _paused: bool) {}
}

/// Adapts a closure into an observer that sees every event.
pub struct FnObserver<F>(pub F);

impl<F> PlayerObserver for FnObserver<F>
where
    F: FnMut(&PlayerEvent) + Send,
{
    fn on_event(&mut self, event: &PlayerEvent) { (self.0)(event) }
}

/// Registered observers, notified in registration order.
#[derive(Default)]
pub(crate) struct ObserverSet {
    observers: Vec<Box<dyn PlayerObserver>>,
}

impl ObserverSet {
    pub(crate) fn push(&mut self, observer: Box<dyn PlayerObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn notify(&mut self, event: &PlayerEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize { self.observers.len() }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .finish()
    }
}
