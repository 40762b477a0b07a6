// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Simulation configuration
//!
//! Force constants live in a [`PhysicsConfig`] owned by each
//! [`Graph`](crate::Graph), and loop timing lives in a [`DriverConfig`] owned
//! by each [`Simulation`](crate::Simulation). Several independent simulations
//! can therefore run side by side with different tuning.
//!
//! Both types derive serde traits, so they can be read from whatever format
//! the host application uses.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default spring stiffness between related nodes
pub const DEFAULT_ATTRACTIVE_CONSTANT: f64 = 50.0;

/// Default strength of the charge-like repulsion between every node pair
pub const DEFAULT_REPULSIVE_CONSTANT: f64 = 10_000.0;

/// Default rest length of a relationship spring
pub const DEFAULT_MINIMUM_SPRING_LENGTH: f64 = 65.0;

/// Default fraction of velocity a node keeps after one second
pub const DEFAULT_FRICTION_COEFFICIENT: f64 = 0.0005;

/// Default number of ticks per second
pub const DEFAULT_TARGET_FRAME_RATE: f64 = 50.0;

/// Force-model tuning
///
/// Changes made through [`Graph::config_mut`](crate::Graph::config_mut)
/// apply from the next physics step.
///
/// # Example
///
/// ```
/// use force_layout::PhysicsConfig;
///
/// let config = PhysicsConfig::default()
///     .with_attractive_constant(20.0)
///     .with_minimum_spring_length(100.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Spring stiffness applied per unit of stretch beyond the rest length
    pub attractive_constant: f64,
    /// Upper bound on the repulsion magnitude between two nodes
    pub repulsive_constant: f64,
    /// Distance at which a relationship exerts no spring force
    pub minimum_spring_length: f64,
    /// Fraction of velocity retained after one second of free motion
    pub friction_coefficient: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            attractive_constant: DEFAULT_ATTRACTIVE_CONSTANT,
            repulsive_constant: DEFAULT_REPULSIVE_CONSTANT,
            minimum_spring_length: DEFAULT_MINIMUM_SPRING_LENGTH,
            friction_coefficient: DEFAULT_FRICTION_COEFFICIENT,
        }
    }
}

impl PhysicsConfig {
    /// Set the spring stiffness
    pub fn with_attractive_constant(mut self, value: f64) -> Self {
        self.attractive_constant = value;
        self
    }

    /// Set the repulsion strength
    pub fn with_repulsive_constant(mut self, value: f64) -> Self {
        self.repulsive_constant = value;
        self
    }

    /// Set the spring rest length
    pub fn with_minimum_spring_length(mut self, value: f64) -> Self {
        self.minimum_spring_length = value;
        self
    }

    /// Set the per-second velocity retention
    pub fn with_friction_coefficient(mut self, value: f64) -> Self {
        self.friction_coefficient = value;
        self
    }

    /// Check that every constant is usable by the force model
    pub fn validate(&self) -> ConfigResult<()> {
        non_negative("attractive_constant", self.attractive_constant)?;
        non_negative("repulsive_constant", self.repulsive_constant)?;
        non_negative("minimum_spring_length", self.minimum_spring_length)?;

        let friction = self.friction_coefficient;
        if !(friction > 0.0 && friction <= 1.0) {
            return Err(ConfigError::FrictionOutOfRange(friction));
        }
        Ok(())
    }
}

/// Size of the area the layout is displayed in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in layout units
    pub width: f64,
    /// Height in layout units
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    /// Centre point of the viewport
    pub fn center(&self) -> crate::Vector2 {
        crate::Vector2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(800.0, 600.0)
    }
}

/// Simulation loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Ticks per second the loop aims for
    pub target_frame_rate: f64,
    /// Display area handed to rendering collaborators
    pub viewport: Viewport,
    /// Number of recent frame times averaged into the effective frame rate
    pub frame_window: usize,
    /// Log a timing report every this many ticks (0 disables reporting)
    pub report_interval: u64,
    /// Give up on a tick when the graph lock cannot be taken in this time.
    /// `None` blocks until the lock is free.
    pub lock_timeout: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            target_frame_rate: DEFAULT_TARGET_FRAME_RATE,
            viewport: Viewport::default(),
            frame_window: 20,
            report_interval: 200,
            lock_timeout: None,
        }
    }
}

impl DriverConfig {
    /// Set the tick rate
    pub fn with_target_frame_rate(mut self, rate: f64) -> Self {
        self.target_frame_rate = rate;
        self
    }

    /// Set the viewport size
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the frame averaging window
    pub fn with_frame_window(mut self, frames: usize) -> Self {
        self.frame_window = frames;
        self
    }

    /// Set the timing report interval
    pub fn with_report_interval(mut self, ticks: u64) -> Self {
        self.report_interval = ticks;
        self
    }

    /// Bound how long a tick waits for the graph lock
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Duration of one tick at the target rate
    ///
    /// Saturates at [`Duration::MAX`] for rates that [`validate`](Self::validate)
    /// rejects as too low.
    pub fn tick_period(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.target_frame_rate).unwrap_or(Duration::MAX)
    }

    /// Check the loop settings
    pub fn validate(&self) -> ConfigResult<()> {
        positive("target_frame_rate", self.target_frame_rate)?;
        if Duration::try_from_secs_f64(1.0 / self.target_frame_rate).is_err() {
            return Err(ConfigError::FrameRateTooLow(self.target_frame_rate));
        }
        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        if self.frame_window == 0 {
            return Err(ConfigError::ZeroCount("frame_window"));
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> ConfigResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
