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

//! Coordination core of a paged, full-screen stories player.
//!
//! A session is an outer sequence of pages, each holding an inner sequence of
//! items. This crate keeps the moving parts consistent:
//! - **Pager**: drag offset, spring settle and the settled page index
//! - **Carousel**: active item per page and tap-zone navigation
//! - **Autoplay timer**: pausable progress ramp for the active item
//! - **Pause coordinator**: drag and long-press pause sources
//! - **Controller**: the single owner that wires them together
//!
//! Rendering, media loading and platform gesture recognition stay with the
//! host. The host feeds gestures and frame ticks in, and reads events and
//! [`RenderSnapshot`]s out.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use storyplay_player::{FnObserver, Page, PlayerConfig, PlayerController, PlayerEvent};
//!
//! let pages = vec![
//!     Page::uniform(["a.jpg", "b.jpg"], Duration::from_secs(5)),
//!     Page::uniform(["c.jpg"], Duration::from_secs(5)),
//! ];
//! let mut player = PlayerController::new(pages, PlayerConfig::default()).unwrap();
//! player.subscribe(Box::new(FnObserver(|event: &PlayerEvent| println!("{event}"))));
//!
//! // Once per frame.
//! player.tick(Duration::from_millis(16));
//! let frame = player.snapshot();
//! println!("page progress {}", frame.page_progress);
//! ```
//!
//! With tokio, [`runtime::spawn`] moves the controller onto its own task and
//! returns a [`PlayerHandle`].

mod carousel;
mod config;
mod controller;
mod err;
mod gesture;
mod metrics;
mod model;
mod observe;
mod pager;
mod pause;
mod render;
pub mod runtime;
mod spring;
mod timer;

pub use carousel::{CarouselStep, ItemCarousel, PagedListView, TapZone};
pub use config::{
    AutoplayConfig, DEFAULT_SPRING_MASS, DEFAULT_SPRING_STIFFNESS, GestureConfig, PlayerConfig,
    SpringConfig, critical_damping,
};
pub use controller::PlayerController;
pub use err::{ConfigError, Error, Result};
pub use gesture::{GestureEvent, PointerEvent, PointerRecognizer};
pub use model::{Item, Page};
pub use observe::{FnObserver, PlayerEvent, PlayerObserver, Transition, Watched};
pub use pager::{DragUpdate, PagePager, PageRequest};
pub use pause::{PauseCoordinator, PauseEdge, PauseSource};
pub use render::{PageSignals, RenderSnapshot, segment_fill, transition_progress};
pub use runtime::{Command, PlayerHandle, RuntimeOptions};
pub use spring::{Spring, SpringTick};
pub use timer::{AutoplayTimer, ResumeOutcome, RunOwner, TimerPhase};
