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

//! Tokio driver for a [`PlayerController`].
//!
//! The controller lives on one task. Ticks come from an interval at frame
//! cadence, input arrives as [`Command`]s, discrete events leave over a
//! bounded channel and the latest [`RenderSnapshot`] is published through a
//! watch channel.

use std::time::Duration;

use bon::Builder;
use smart_default::SmartDefault;
use snafu::OptionExt;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    controller::PlayerController,
    err::{Result, RuntimeClosedSnafu},
    gesture::{GestureEvent, PointerEvent},
    observe::{FnObserver, PlayerEvent},
    render::RenderSnapshot,
};

/// Runtime driver settings.
#[derive(Debug, Clone, SmartDefault, Builder)]
pub struct RuntimeOptions {
    /// Tick cadence.
    #[default(Duration::from_millis(16))]
    #[builder(default = Duration::from_millis(16))]
    pub frame_interval: Duration,
    /// Capacity of the event channel. Events are dropped with a warning when
    /// the host falls this far behind.
    #[default = 256]
    #[builder(default = 256)]
    pub event_buffer:   usize,
    #[default = "storyplay"]
    #[builder(default = "storyplay")]
    pub name:           &'static str,
}

/// Input accepted by the runtime task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Gesture(GestureEvent),
    /// Raw pointer sample, stamped with [`PlayerHandle::elapsed`].
    Pointer(PointerEvent),
    RequestPageChange(isize),
    SetPageIndex(isize),
    Resize(f32),
}

/// Host side of a spawned player.
pub struct PlayerHandle {
    name:      &'static str,
    commands:  mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<RenderSnapshot>,
    events:    Option<mpsc::Receiver<PlayerEvent>>,
    cancel:    CancellationToken,
    task:      Option<JoinHandle<()>>,
    started:   Instant,
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Moves `controller` onto a new task and starts ticking it.
///
/// Must be called from within a tokio runtime.
pub fn spawn<T>(mut controller: PlayerController<T>, options: RuntimeOptions) -> PlayerHandle
where
    T: Send + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(options.event_buffer.max(1));
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
    let cancel = CancellationToken::new();
    let started = Instant::now();

    let name = options.name;
    controller.subscribe(Box::new(FnObserver(move |event: &PlayerEvent| {
        if let Err(err) = event_tx.try_send(*event) {
            warn!(runtime = name, %event, %err, "dropping player event");
        }
    })));

    let task = tokio::spawn(drive(
        controller,
        command_rx,
        snapshot_tx,
        cancel.clone(),
        options,
        started,
    ));
    info!(runtime = name, "player runtime started");

    PlayerHandle {
        name,
        commands: command_tx,
        snapshots: snapshot_rx,
        events: Some(event_rx),
        cancel,
        task: Some(task),
        started,
    }
}

async fn drive<T>(
    mut controller: PlayerController<T>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<RenderSnapshot>,
    cancel: CancellationToken,
    options: RuntimeOptions,
    started: Instant,
) {
    let mut interval = tokio::time::interval(options.frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = started;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            now = interval.tick() => {
                controller.tick(now.saturating_duration_since(last));
                last = now;
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!(runtime = options.name, "all handles dropped");
                    break;
                };
                apply(&mut controller, command);
            }
        }
        snapshots.send_replace(controller.snapshot());
    }
    info!(runtime = options.name, "player runtime stopped");
}

fn apply<T>(controller: &mut PlayerController<T>, command: Command) {
    match command {
        Command::Gesture(event) => controller.handle_gesture(event),
        Command::Pointer(event) => controller.handle_pointer(event),
        Command::RequestPageChange(delta) => {
            controller.request_page_change(delta);
        }
        Command::SetPageIndex(index) => {
            controller.set_page_index(index);
        }
        Command::Resize(width) => controller.resize(width),
    }
}

impl PlayerHandle {
    pub const fn name(&self) -> &'static str { self.name }

    /// Time since the runtime started, on the clock the controller is
    /// ticked with. Use it to stamp [`PointerEvent`]s.
    pub fn elapsed(&self) -> Duration { self.started.elapsed() }

    pub fn is_closed(&self) -> bool { self.commands.is_closed() }

    /// Queues a command for the runtime task.
    ///
    /// # Errors
    /// Returns [`crate::Error::RuntimeClosed`] once the task has stopped.
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .ok()
            .context(RuntimeClosedSnafu { name: self.name })
    }

    pub fn gesture(&self, event: GestureEvent) -> Result<()> { self.send(Command::Gesture(event)) }

    pub fn pointer(&self, event: PointerEvent) -> Result<()> { self.send(Command::Pointer(event)) }

    pub fn request_page_change(&self, delta: isize) -> Result<()> {
        self.send(Command::RequestPageChange(delta))
    }

    pub fn set_page_index(&self, index: isize) -> Result<()> { self.send(Command::SetPageIndex(index)) }

    pub fn resize(&self, width: f32) -> Result<()> { self.send(Command::Resize(width)) }

    /// Latest published render snapshot.
    pub fn snapshot(&self) -> RenderSnapshot { self.snapshots.borrow().clone() }

    /// A receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<RenderSnapshot> { self.snapshots.clone() }

    /// Takes the event stream. Only the first call returns it.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<PlayerEvent>> { self.events.take() }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(err) = task.await {
            warn!(runtime = self.name, %err, "player runtime task failed");
        }
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) { self.cancel.cancel(); }
}
