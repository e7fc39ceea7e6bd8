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

//! Damped spring integrator used to settle the pager offset.

use std::time::Duration;

use crate::config::SpringConfig;

/// Integration step. Frame deltas are split into steps of at most this size
/// so stiff profiles stay stable at any refresh rate.
const MAX_STEP_SECS: f32 = 0.001;

/// Result of advancing a spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpringTick {
    /// Still in motion at the given position.
    Moving(f32),
    /// Came to rest exactly on the target.
    Settled(f32),
}

impl SpringTick {
    pub const fn position(self) -> f32 {
        match self {
            Self::Moving(p) | Self::Settled(p) => p,
        }
    }
}

/// A one-dimensional mass-spring-damper heading for `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    position:        f32,
    velocity:        f32,
    target:          f32,
    stiffness:       f32,
    damping:         f32,
    mass:            f32,
    rest_speed:      f32,
    rest_distance:   f32,
    clamp_overshoot: bool,
}

impl Spring {
    pub fn new(position: f32, velocity: f32, target: f32, config: &SpringConfig) -> Self {
        Self {
            position,
            velocity,
            target,
            stiffness: config.stiffness,
            damping: config.damping,
            mass: config.mass,
            rest_speed: config.rest_speed_threshold,
            rest_distance: config.rest_displacement_threshold,
            clamp_overshoot: config.overshoot_clamping,
        }
    }

    pub const fn position(&self) -> f32 { self.position }

    pub const fn velocity(&self) -> f32 { self.velocity }

    pub const fn target(&self) -> f32 { self.target }

    fn at_rest(&self) -> bool {
        self.velocity.abs() < self.rest_speed
            && (self.target - self.position).abs() < self.rest_distance
    }

    /// Advances the simulation by `dt`.
    ///
    /// Once settled the position is snapped to the target; further calls
    /// keep returning [`SpringTick::Settled`].
    pub fn step(&mut self, dt: Duration) -> SpringTick {
        if self.at_rest() {
            self.snap();
            return SpringTick::Settled(self.position);
        }

        let mut remaining = dt.as_secs_f32();
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP_SECS);
            remaining -= h;

            let before = self.target - self.position;
            let accel =
                (self.stiffness * before - self.damping * self.velocity) / self.mass;
            self.velocity += accel * h;
            self.position += self.velocity * h;

            let after = self.target - self.position;
            let crossed = before != 0.0 && before.signum() != after.signum();
            if (self.clamp_overshoot && crossed) || self.at_rest() {
                self.snap();
                return SpringTick::Settled(self.position);
            }
        }
        SpringTick::Moving(self.position)
    }

    fn snap(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_settled(spring: &mut Spring, frame: Duration, max_frames: usize) -> Option<usize> {
        (1..=max_frames).find(|_| matches!(spring.step(frame), SpringTick::Settled(_)))
    }

    #[test]
    fn critically_damped_spring_settles_without_overshoot() {
        let config = SpringConfig::default();
        let mut spring = Spring::new(0.0, 0.0, -390.0, &config);
        let frame = Duration::from_millis(16);

        let mut lowest = 0.0f32;
        let mut frames = 0;
        loop {
            frames += 1;
            let tick = spring.step(frame);
            lowest = lowest.min(tick.position());
            if let SpringTick::Settled(p) = tick {
                assert_eq!(p, -390.0);
                break;
            }
            assert!(frames < 200, "spring never settled");
        }
        assert!(lowest >= -390.0 - config.rest_displacement_threshold);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn settled_spring_stays_settled() {
        let mut spring = Spring::new(10.0, 0.0, 10.0, &SpringConfig::default());
        assert_eq!(spring.step(Duration::from_millis(16)), SpringTick::Settled(10.0));
        assert_eq!(spring.step(Duration::from_millis(16)), SpringTick::Settled(10.0));
    }

    #[test]
    fn overshoot_clamping_stops_at_target() {
        let config = SpringConfig {
            damping: 1.0,
            overshoot_clamping: true,
            ..SpringConfig::default()
        };
        let mut spring = Spring::new(0.0, 0.0, 100.0, &config);
        let frames = run_until_settled(&mut spring, Duration::from_millis(16), 100);
        assert!(frames.is_some());
        assert_eq!(spring.position(), 100.0);
    }

    #[test]
    fn frame_rate_does_not_change_outcome() {
        let config = SpringConfig::default();
        let mut coarse = Spring::new(0.0, 0.0, 780.0, &config);
        let mut fine = Spring::new(0.0, 0.0, 780.0, &config);
        coarse.step(Duration::from_millis(32));
        fine.step(Duration::from_millis(16));
        fine.step(Duration::from_millis(16));
        assert!((coarse.position() - fine.position()).abs() < 0.01);
    }
}
