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
//! Frame timing and friction normalization
//!
//! The friction coefficient is expressed per second: it is the fraction of
//! velocity a free node keeps after one second. Applying it per tick needs
//! the tick rate, and the actual tick rate drifts, so the per-frame factor is
//! recomputed from a rolling average of measured frame times every tick:
//!
//! ```text
//! factor = coefficient ^ (1 / frame_rate)
//! ```
//!
//! Raising `factor` to the power `frame_rate` gives back `coefficient`, so a
//! second of motion loses the same share of velocity at any tick rate.

use std::collections::VecDeque;
use std::time::Duration;

/// Per-frame damping that keeps `coefficient` of velocity after one second
/// at `frame_rate` ticks per second
pub fn friction_factor(coefficient: f64, frame_rate: f64) -> f64 {
    coefficient.powf(1.0 / frame_rate)
}

/// Timing inputs of one physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    frame_rate: f64,
    friction_factor: f64,
}

impl FrameTiming {
    /// Derive the step timing from the effective frame rate and the
    /// per-second friction coefficient
    pub fn new(frame_rate: f64, friction_coefficient: f64) -> Self {
        FrameTiming {
            frame_rate,
            friction_factor: friction_factor(friction_coefficient, frame_rate),
        }
    }

    /// Ticks per second used to scale acceleration and velocity
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Velocity multiplier applied once per tick
    pub fn friction_factor(&self) -> f64 {
        self.friction_factor
    }

    /// Whether the frame rate can be used to integrate
    pub fn is_valid(&self) -> bool {
        self.frame_rate > 0.0 && self.frame_rate.is_finite() && self.friction_factor.is_finite()
    }
}

/// Rolling average of recent frame durations
///
/// Holds at most `window` samples; the oldest is dropped when a new one
/// arrives. Until a measurable sample has been recorded the average frame
/// rate is the fallback rate given at construction.
///
/// # Example
///
/// ```
/// use force_layout::FramerateAverager;
/// use std::time::Duration;
///
/// let mut averager = FramerateAverager::new(4, 50.0);
/// assert_eq!(averager.average_frame_rate(), 50.0);
///
/// averager.add_frame_time(Duration::from_millis(25));
/// averager.add_frame_time(Duration::from_millis(25));
/// assert!((averager.average_frame_rate() - 40.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct FramerateAverager {
    samples: VecDeque<Duration>,
    window: usize,
    total: Duration,
    fallback_rate: f64,
}

impl FramerateAverager {
    /// Create an averager over `window` frames
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    pub fn new(window: usize, fallback_rate: f64) -> Self {
        assert!(window > 0, "Frame window must be at least 1");
        FramerateAverager {
            samples: VecDeque::with_capacity(window),
            window,
            total: Duration::ZERO,
            fallback_rate,
        }
    }

    /// Record how long the last frame took
    ///
    /// The running total saturates, so absurdly long frames only skew the
    /// average until they leave the window.
    pub fn add_frame_time(&mut self, frame_time: Duration) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(frame_time);
        self.total = self
            .samples
            .iter()
            .fold(Duration::ZERO, |total, sample| total.saturating_add(*sample));
    }

    /// Mean frame time across the window, if any samples exist
    pub fn average_frame_time(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.total / self.samples.len() as u32)
        }
    }

    /// Frames per second implied by the window
    pub fn average_frame_rate(&self) -> f64 {
        let seconds = self.total.as_secs_f64();
        if self.samples.is_empty() || seconds <= 0.0 {
            self.fallback_rate
        } else {
            self.samples.len() as f64 / seconds
        }
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples have been recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
        self.total = Duration::ZERO;
    }
}
