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
//! Simulation driver
//!
//! The driver owns the tick loop. Each tick:
//!
//! 1. records the measured time since the previous tick and updates the
//!    rolling frame-rate average,
//! 2. takes the graph lock,
//! 3. runs [`TickHooks::before_physics`] (input handling),
//! 4. recomputes the per-frame friction factor from the average rate and
//!    runs one physics step,
//! 5. runs [`TickHooks::after_physics`] (draw preparation),
//! 6. releases the lock.
//!
//! Between ticks the loop sleeps until the next deadline. Deadlines advance
//! by exactly one period so jitter does not accumulate. A loop that falls
//! more than a period behind restarts its schedule from the current instant
//! instead of bursting to catch up.
//!
//! Stopping is cooperative: [`StopFlag::request_stop`] is observed at the
//! next tick boundary, never mid-tick.

use crate::config::DriverConfig;
use crate::error::ConfigResult;
use crate::graph::{Graph, StepSafe, StepStats};
use crate::shared::SharedGraph;
use crate::timing::{FrameTiming, FramerateAverager};
use std::fmt::Debug;
use std::hash::Hash;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Collaborator callbacks run inside a tick, under the graph lock
///
/// Both methods default to doing nothing, and `()` implements the trait for
/// headless simulations. Implementations must not block: the whole tick,
/// hooks included, runs with the lock held.
pub trait TickHooks<K, P> {
    /// Handle pending input before forces are computed
    fn before_physics(&mut self, _graph: &mut Graph<K, P>) {}

    /// Read the updated layout, e.g. to prepare draw data
    fn after_physics(&mut self, _graph: &Graph<K, P>) {}
}

impl<K, P> TickHooks<K, P> for () {}

/// Cooperative stop request shared between the loop and its controllers
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    flag: Arc<AtomicBool>,
}

impl StopFlag {
    /// Create a flag that is not yet raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to exit at the next tick boundary
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Measurements of a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Time since the previous tick, as fed into the average
    pub frame_time: Duration,
    /// Averaged frame rate used for integration
    pub frame_rate: f64,
    /// Per-frame velocity damping used for integration
    pub friction_factor: f64,
    /// What the physics step did
    pub stats: StepStats,
    /// Time spent in [`TickHooks::before_physics`]
    pub input_time: Duration,
    /// Time spent in the physics step
    pub physics_time: Duration,
    /// Time spent in [`TickHooks::after_physics`]
    pub draw_time: Duration,
}

/// Drives physics steps on a shared graph at a target rate
///
/// # Example
///
/// ```
/// use force_layout::{DriverConfig, Graph, Node, SharedGraph, Simulation, Vector2};
/// use std::time::Duration;
///
/// let shared = SharedGraph::new(Graph::new());
/// shared.with(|graph| {
///     graph.add_node(Node::new(1, Vector2::new(0.0, 0.0)));
///     graph.add_node(Node::new(2, Vector2::new(10.0, 0.0)));
/// });
///
/// let mut simulation = Simulation::new(shared.clone(), DriverConfig::default()).unwrap();
/// let report = simulation.tick(Duration::from_millis(20)).unwrap();
/// assert_eq!(report.stats.pairs, 1);
/// ```
pub struct Simulation<K, P = (), H = ()> {
    graph: SharedGraph<K, P>,
    config: DriverConfig,
    hooks: H,
    averager: FramerateAverager,
    stop: StopFlag,
    ticks: u64,
    skipped: u64,
}

impl<K, P> Simulation<K, P, ()>
where
    K: Eq + Hash + Clone + Debug + StepSafe,
    P: StepSafe,
{
    /// Create a headless simulation after validating `config`
    pub fn new(graph: SharedGraph<K, P>, config: DriverConfig) -> ConfigResult<Self> {
        config.validate()?;
        let averager = FramerateAverager::new(config.frame_window, config.target_frame_rate);
        Ok(Simulation {
            graph,
            config,
            hooks: (),
            averager,
            stop: StopFlag::new(),
            ticks: 0,
            skipped: 0,
        })
    }
}

impl<K, P, H> Simulation<K, P, H>
where
    K: Eq + Hash + Clone + Debug + StepSafe,
    P: StepSafe,
    H: TickHooks<K, P>,
{
    /// Attach input/draw collaborators
    pub fn with_hooks<H2: TickHooks<K, P>>(self, hooks: H2) -> Simulation<K, P, H2> {
        Simulation {
            graph: self.graph,
            config: self.config,
            hooks,
            averager: self.averager,
            stop: self.stop,
            ticks: self.ticks,
            skipped: self.skipped,
        }
    }

    /// Handle to the simulated graph
    pub fn graph(&self) -> &SharedGraph<K, P> {
        &self.graph
    }

    /// Loop settings
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Attached collaborators
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable access to the attached collaborators
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Flag that stops [`run`](Self::run) at the next tick boundary
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Ticks completed so far
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Ticks abandoned because the lock could not be taken in time
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped
    }

    /// Frame rate currently used for integration
    pub fn effective_frame_rate(&self) -> f64 {
        self.averager.average_frame_rate()
    }

    /// Run one tick as if `elapsed` had passed since the previous one
    ///
    /// Returns `None` if a lock timeout is configured and the lock stayed
    /// busy; the tick is then skipped entirely.
    pub fn tick(&mut self, elapsed: Duration) -> Option<TickReport> {
        self.averager.add_frame_time(elapsed);
        let frame_rate = self.averager.average_frame_rate();

        let mut graph = match self.config.lock_timeout {
            Some(timeout) => match self.graph.try_lock_for(timeout) {
                Ok(graph) => graph,
                Err(err) => {
                    self.skipped += 1;
                    tracing::warn!(error = %err, tick = self.ticks, "skipping tick");
                    return None;
                }
            },
            None => self.graph.lock(),
        };

        let start = Instant::now();
        self.hooks.before_physics(&mut graph);
        let input_time = start.elapsed();

        let start = Instant::now();
        let timing = FrameTiming::new(frame_rate, graph.config().friction_coefficient);
        let stats = graph.step(&timing);
        let physics_time = start.elapsed();

        let start = Instant::now();
        self.hooks.after_physics(&graph);
        let draw_time = start.elapsed();

        graph.unlock();
        self.ticks += 1;

        let report = TickReport {
            frame_time: elapsed,
            frame_rate,
            friction_factor: timing.friction_factor(),
            stats,
            input_time,
            physics_time,
            draw_time,
        };

        if self.config.report_interval > 0 && self.ticks % self.config.report_interval == 0 {
            tracing::debug!(
                tick = self.ticks,
                input = ?report.input_time,
                physics = ?report.physics_time,
                draw = ?report.draw_time,
                frame_time = ?report.frame_time,
                frame_rate = report.frame_rate,
                "tick timings"
            );
        }

        Some(report)
    }

    /// Tick on the calling thread until a stop is requested
    pub fn run(&mut self) {
        let period = self.config.tick_period();
        let mut last = Instant::now();
        let mut deadline = last + period;

        tracing::debug!(target_frame_rate = self.config.target_frame_rate, "simulation started");

        while !self.stop.is_stop_requested() {
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
            if self.stop.is_stop_requested() {
                break;
            }

            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;

            self.tick(elapsed);

            deadline += period;
            let now = Instant::now();
            if now.saturating_duration_since(deadline) > period {
                tracing::trace!(behind = ?now.duration_since(deadline), "resetting tick schedule");
                deadline = now;
            }
        }

        tracing::debug!(ticks = self.ticks, skipped = self.skipped, "simulation stopped");
    }
}

impl<K, P, H> Simulation<K, P, H>
where
    K: Eq + Hash + Clone + Debug + StepSafe + Send + 'static,
    P: StepSafe + Send + 'static,
    H: TickHooks<K, P> + Send + 'static,
{
    /// Run the loop on a dedicated thread
    pub fn spawn(mut self) -> io::Result<SimulationHandle<K, P, H>> {
        let stop = self.stop_flag();
        let thread = thread::Builder::new()
            .name("force-layout".to_string())
            .spawn(move || {
                self.run();
                self
            })?;
        Ok(SimulationHandle { stop, thread })
    }
}

/// Controller for a simulation running on its own thread
pub struct SimulationHandle<K, P = (), H = ()> {
    stop: StopFlag,
    thread: JoinHandle<Simulation<K, P, H>>,
}

impl<K, P, H> SimulationHandle<K, P, H> {
    /// Ask the loop to exit at the next tick boundary
    pub fn stop(&self) {
        self.stop.request_stop();
    }

    /// The loop's stop flag
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Whether the loop thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Stop the loop and wait for it, returning the simulation
    pub fn join(self) -> thread::Result<Simulation<K, P, H>> {
        self.stop.request_stop();
        self.thread.join()
    }
}
