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

use snafu::Snafu;

/// Result type for player construction and runtime handle operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// Player Errors
// ============================================================================

/// Errors surfaced by the player.
///
/// Gesture, tick and navigation operations never fail: boundary hits and
/// stale timer callbacks are state-machine guards, not errors. Only session
/// construction and sends to a stopped runtime return an error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The session configuration was rejected at construction time.
    #[snafu(transparent)]
    InvalidConfiguration {
        source: ConfigError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },

    /// The runtime task has already shut down.
    #[snafu(display("Player runtime '{name}' is closed"))]
    RuntimeClosed {
        name: &'static str,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Reasons a session configuration is rejected.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    #[snafu(display("Invalid configuration: a session needs at least one page"))]
    NoPages {
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    #[snafu(display("Invalid configuration: page {page} has no items"))]
    EmptyPage {
        page: usize,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },

    #[snafu(display("Invalid configuration: item {item} of page {page} has a non-positive duration"))]
    NonPositiveDuration {
        page: usize,
        item: usize,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },

    #[snafu(display(
        "Invalid configuration: initial page index {index} is out of range for {page_count} pages"
    ))]
    InitialPageOutOfRange {
        index:      usize,
        page_count: usize,
        #[snafu(implicit)]
        loc:        snafu::Location,
    },

    #[snafu(display(
        "Invalid configuration: initial item {index} of page {page} is out of range for \
         {item_count} items"
    ))]
    InitialItemOutOfRange {
        page:       usize,
        index:      usize,
        item_count: usize,
        #[snafu(implicit)]
        loc:        snafu::Location,
    },

    #[snafu(display("Invalid configuration: page width must be positive, got {width}"))]
    NonPositivePageWidth {
        width: f32,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },

    #[snafu(display("Invalid configuration: gesture threshold {name} = {value} is out of range"))]
    InvalidThreshold {
        name:  &'static str,
        value: f32,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },

    #[snafu(display("Invalid configuration: spring parameter {name} = {value} is out of range"))]
    InvalidSpring {
        name:  &'static str,
        value: f32,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },
}
