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

use std::sync::LazyLock;

use prometheus::{IntCounter, IntCounterVec, register_int_counter, register_int_counter_vec};

pub const EDGE_LABEL: &str = "edge";
pub const CAUSE_LABEL: &str = "cause";

pub static PAGE_CHANGES: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "storyplay_page_changes_total",
        "Total number of settled page changes"
    )
    .unwrap()
});

pub static BOUNDARY_HITS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "storyplay_boundary_hits_total",
        "Total number of page requests rejected at the first or last page",
        &[EDGE_LABEL]
    )
    .unwrap()
});

pub static AUTOPLAY_COMPLETIONS: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "storyplay_autoplay_completions_total",
        "Total number of autoplay timer runs that reached the end"
    )
    .unwrap()
});

pub static PAUSE_EDGES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "storyplay_pause_edges_total",
        "Total number of combined pause signal edges",
        &[EDGE_LABEL]
    )
    .unwrap()
});

pub static ITEM_JUMPS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "storyplay_item_jumps_total",
        "Total number of active item changes",
        &[CAUSE_LABEL]
    )
    .unwrap()
});
