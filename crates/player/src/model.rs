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

//! Pages and items supplied by the host when a session is created.

use std::time::Duration;

use snafu::ensure;

use crate::err::{ConfigError, EmptyPageSnafu, InitialItemOutOfRangeSnafu, NonPositiveDurationSnafu};

/// One piece of content inside a page.
///
/// The payload is opaque to the player; only `duration` drives behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<T> {
    pub payload:  T,
    /// How long the autoplay timer runs while this item is active.
    pub duration: Duration,
}

impl<T> Item<T> {
    pub const fn new(payload: T, duration: Duration) -> Self { Self { payload, duration } }
}

/// An ordered, fixed-size sequence of items shown as one full-screen unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items:        Vec<Item<T>>,
    initial_item: usize,
}

impl<T> Page<T> {
    pub const fn new(items: Vec<Item<T>>) -> Self {
        Self {
            items,
            initial_item: 0,
        }
    }

    /// Builds a page whose items all share one duration.
    pub fn uniform(payloads: impl IntoIterator<Item = T>, duration: Duration) -> Self {
        Self::new(
            payloads
                .into_iter()
                .map(|payload| Item::new(payload, duration))
                .collect(),
        )
    }

    /// Selects the item the page's carousel starts on.
    #[must_use]
    pub const fn with_initial_item(mut self, index: usize) -> Self {
        self.initial_item = index;
        self
    }

    pub fn items(&self) -> &[Item<T>] { &self.items }

    pub fn item(&self, index: usize) -> Option<&Item<T>> { self.items.get(index) }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub const fn initial_item(&self) -> usize { self.initial_item }

    /// Duration of the item at `index`, if it exists.
    pub fn duration_of(&self, index: usize) -> Option<Duration> {
        self.items.get(index).map(|item| item.duration)
    }

    pub(crate) fn validate(&self, page: usize) -> Result<(), ConfigError> {
        ensure!(!self.items.is_empty(), EmptyPageSnafu { page });
        for (item, entry) in self.items.iter().enumerate() {
            ensure!(
                !entry.duration.is_zero(),
                NonPositiveDurationSnafu { page, item }
            );
        }
        ensure!(
            self.initial_item < self.items.len(),
            InitialItemOutOfRangeSnafu {
                page,
                index: self.initial_item,
                item_count: self.items.len(),
            }
        );
        Ok(())
    }
}
