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
//! # Force Layout
//!
//! A force-directed layout engine for directed graphs that keep changing
//! while the simulation runs.
//!
//! ## Features
//!
//! - **Spring/charge model**: relationships pull their endpoints towards a
//!   rest length, every pair of nodes repels, and friction damps motion
//! - **Rate-independent friction**: the per-frame damping is recomputed from
//!   a rolling frame-rate average so a second of motion decays the same at
//!   any tick rate
//! - **Live mutation**: other threads add and remove nodes and relationships
//!   through a [`SharedGraph`] while a [`Simulation`] ticks
//! - **Pinning**: static nodes take part in force computation but never move
//! - **Parallelization**: optional Rayon integration for the all-pairs
//!   repulsive pass (`parallel` feature)
//!
//! ## Example
//!
//! ```rust
//! use force_layout::{DriverConfig, Graph, Node, SharedGraph, Simulation, Vector2};
//! use std::thread;
//! use std::time::Duration;
//!
//! let shared = SharedGraph::new(Graph::new());
//! shared.with(|graph| {
//!     graph.add_node(Node::new("hub", Vector2::new(400.0, 300.0)).with_static(true));
//!     graph.add_node(Node::new("leaf", Vector2::new(600.0, 300.0)));
//!     graph.add_relationship("hub", "leaf");
//! });
//!
//! let handle = Simulation::new(shared.clone(), DriverConfig::default())
//!     .unwrap()
//!     .spawn()
//!     .unwrap();
//!
//! // Mutate from this thread while the simulation runs
//! shared.with(|graph| {
//!     graph.add_node(Node::new("late", Vector2::new(400.0, 500.0)));
//!     graph.add_relationship("late", "hub");
//! });
//!
//! thread::sleep(Duration::from_millis(50));
//! handle.join().unwrap();
//!
//! let hub = shared.with(|graph| graph.node(&"hub").unwrap().position());
//! assert_eq!(hub, Vector2::new(400.0, 300.0));
//! ```

#![warn(missing_docs)]

/// Tunable constants and loop settings
pub mod config;

/// Tick loop driving the simulation
pub mod driver;

/// Error types
pub mod error;

/// Interaction events passed from collaborators to the application
pub mod events;

/// Graph topology and the physics step
pub mod graph;

/// Nodes and pairwise force laws
pub mod node;

/// Lock-protected graph handle
pub mod shared;

/// Frame-rate averaging and friction normalization
pub mod timing;

/// 2D vector math
pub mod vector;

pub use config::{DriverConfig, PhysicsConfig, Viewport};
pub use driver::{Simulation, SimulationHandle, StopFlag, TickHooks, TickReport};
pub use error::{ConfigError, ConfigResult, LockError, TopologyError, TopologyResult};
pub use events::{EventQueue, InteractionEvent};
pub use graph::{Adjacency, Graph, GraphData, StepSafe, StepStats};
pub use node::Node;
pub use shared::{GraphGuard, SharedGraph};
pub use timing::{friction_factor, FrameTiming, FramerateAverager};
pub use vector::Vector2;
