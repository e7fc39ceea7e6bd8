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

//! Session configuration.
//!
//! All structs deserialize with `#[serde(default)]`, so a host can supply a
//! partial document and get the stock thresholds for everything it omits.

use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use snafu::ensure;

use crate::err::{ConfigError, InvalidSpringSnafu, InvalidThresholdSnafu, NonPositivePageWidthSnafu};

/// Stiffness used when none is configured.
pub const DEFAULT_SPRING_STIFFNESS: f32 = 100.0;

/// Mass used when none is configured.
pub const DEFAULT_SPRING_MASS: f32 = 0.2;

/// Damping coefficient that makes a spring critically damped.
#[must_use]
pub fn critical_damping(stiffness: f32, mass: f32) -> f32 { 2.0 * (stiffness * mass).sqrt() }

/// Top-level player configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, SmartDefault, Builder)]
#[serde(default)]
pub struct PlayerConfig {
    /// Width of one page in logical pixels. Paging math and tap zones are
    /// both expressed in this unit.
    #[default = 390.0]
    #[builder(default = 390.0)]
    pub page_width:         f32,
    /// Page settled when the session starts.
    #[builder(default)]
    pub initial_page_index: usize,
    #[builder(default)]
    pub gesture:            GestureConfig,
    #[builder(default)]
    pub spring:             SpringConfig,
    #[builder(default)]
    pub autoplay:           AutoplayConfig,
}

impl PlayerConfig {
    /// Checks the numeric fields. Page/item level checks happen when the
    /// session is assembled, see [`crate::PlayerController::new`].
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.page_width.is_finite() && self.page_width > 0.0,
            NonPositivePageWidthSnafu {
                width: self.page_width,
            }
        );
        self.gesture.validate()?;
        self.spring.validate()
    }
}

/// Pan and long-press thresholds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, SmartDefault, Builder)]
#[serde(default)]
pub struct GestureConfig {
    /// Pointer travel (px) before a touch counts as a drag.
    #[default = 10.0]
    #[builder(default = 10.0)]
    pub min_distance:               f32,
    /// Release velocity (px/s) above which a drag end is treated as a fling.
    #[default = 300.0]
    #[builder(default = 300.0)]
    pub min_fling_velocity:         f32,
    /// How far past the first/last page a drag may pull, in page widths.
    #[default = 0.4]
    #[builder(default = 0.4)]
    pub bounce_threshold:           f32,
    /// Hold time before a press becomes a long press.
    #[default = 500]
    #[builder(default = 500)]
    pub long_press_min_duration_ms: u64,
    /// Pointer travel (px) that disqualifies a press from becoming a long
    /// press.
    #[default = 10.0]
    #[builder(default = 10.0)]
    pub long_press_max_distance:    f32,
}

impl GestureConfig {
    #[must_use]
    pub const fn long_press_min_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_min_duration_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_distance", self.min_distance),
            ("min_fling_velocity", self.min_fling_velocity),
            ("bounce_threshold", self.bounce_threshold),
            ("long_press_max_distance", self.long_press_max_distance),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                InvalidThresholdSnafu { name, value }
            );
        }
        Ok(())
    }
}

/// Spring profile used to settle the pager on a page boundary.
///
/// The stock profile is critically damped: it converges without overshoot
/// in the shortest time for its stiffness and mass.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, SmartDefault, Builder)]
#[serde(default)]
pub struct SpringConfig {
    #[default(DEFAULT_SPRING_STIFFNESS)]
    #[builder(default = DEFAULT_SPRING_STIFFNESS)]
    pub stiffness:                   f32,
    #[default(DEFAULT_SPRING_MASS)]
    #[builder(default = DEFAULT_SPRING_MASS)]
    pub mass:                        f32,
    #[default(critical_damping(DEFAULT_SPRING_STIFFNESS, DEFAULT_SPRING_MASS))]
    #[builder(default = critical_damping(DEFAULT_SPRING_STIFFNESS, DEFAULT_SPRING_MASS))]
    pub damping:                     f32,
    /// Speed (px/s) under which the spring may come to rest.
    #[default = 0.2]
    #[builder(default = 0.2)]
    pub rest_speed_threshold:        f32,
    /// Distance (px) from the target under which the spring may come to rest.
    #[default = 0.2]
    #[builder(default = 0.2)]
    pub rest_displacement_threshold: f32,
    /// Stop at the target instead of overshooting it.
    #[default = false]
    #[builder(default = false)]
    pub overshoot_clamping:          bool,
}

impl SpringConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value, allow_zero) in [
            ("stiffness", self.stiffness, false),
            ("mass", self.mass, false),
            ("damping", self.damping, true),
            ("rest_speed_threshold", self.rest_speed_threshold, false),
            (
                "rest_displacement_threshold",
                self.rest_displacement_threshold,
                false,
            ),
        ] {
            let in_range = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
            ensure!(in_range, InvalidSpringSnafu { name, value });
        }
        Ok(())
    }
}

/// Autoplay behaviour switches.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, SmartDefault, Builder)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Start a fresh timer whenever the active (page, item) pair changes.
    #[default = true]
    #[builder(default = true)]
    pub enabled:             bool,
    /// Hold the timer while a long press is active.
    #[default = true]
    #[builder(default = true)]
    pub pause_on_long_press: bool,
    /// Hold the timer while a drag is moving the pager.
    #[default = true]
    #[builder(default = true)]
    pub pause_on_drag:       bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.spring.damping - 8.944_272).abs() < 1e-4);
    }

    #[test]
    fn builder_matches_default() {
        assert_eq!(PlayerConfig::builder().build(), PlayerConfig::default());
        assert_eq!(GestureConfig::builder().build(), GestureConfig::default());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"page_width": 400.0, "gesture": {"min_distance": 4.0}}"#)
                .unwrap();
        assert_eq!(config.page_width, 400.0);
        assert_eq!(config.gesture.min_distance, 4.0);
        assert_eq!(config.gesture.min_fling_velocity, 300.0);
        assert!(config.autoplay.enabled);
    }

    #[test]
    fn rejects_bad_numbers() {
        let config = PlayerConfig::builder().page_width(0.0).build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositivePageWidth { .. })
        ));

        let config = PlayerConfig::builder()
            .gesture(GestureConfig::builder().bounce_threshold(-0.1).build())
            .build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold {
                name: "bounce_threshold",
                ..
            })
        ));

        let config = PlayerConfig::builder()
            .spring(SpringConfig::builder().mass(f32::NAN).build())
            .build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpring { name: "mass", .. })
        ));
    }
}
