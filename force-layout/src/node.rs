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
//! Graph nodes and the forces acting on them
//!
//! A node knows only about itself. It has no idea which nodes it is related
//! to; the [`Graph`](crate::Graph) decides which pairs interact and asks each
//! node for the force acting on *itself* given the other node.
//!
//! # Force Model
//!
//! Both forces point along the angle from `self` to `other`:
//!
//! - **Attraction** (per relationship): `k_a * (d - L)`, where `L` is the
//!   minimum spring length. Closer than `L` the value is negative and the
//!   spring pushes. There is no upper bound, so distant related nodes pull
//!   together strongly.
//! - **Repulsion** (per pair): `-k_r * q / ((max(d, 15) * 0.2)^2 + q)` with
//!   `q = charge_a * charge_b`. The magnitude never exceeds `k_r`.
//!
//! The graph applies the returned force `f` to `self` and `-f` to `other`.

use crate::config::PhysicsConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::timing::FrameTiming;
use crate::vector::Vector2;
use std::fmt::Debug;

/// Offset added to each axis before taking the angle between two nodes, so
/// that coincident nodes still get a defined direction
pub const ANGLE_EPSILON: f64 = 0.01;

/// Separation below which repulsion stops growing
pub const REPULSION_DISTANCE_FLOOR: f64 = 15.0;

/// Scale applied to the clamped distance inside the repulsion falloff
const REPULSION_FALLOFF: f64 = 0.2;

/// Default node charge
pub const DEFAULT_CHARGE: f64 = 10.0;

/// Default hit-test radius
pub const DEFAULT_RADIUS: f64 = 9.0;

/// A node of the layout graph
///
/// `K` is the caller-assigned identifier and `P` an arbitrary payload that
/// the engine carries around but never interprets.
///
/// # Example
///
/// ```
/// use force_layout::{Node, Vector2};
///
/// let node = Node::new("root", Vector2::new(10.0, 20.0))
///     .with_charge(5.0)
///     .with_static(true);
/// assert_eq!(node.uid(), &"root");
/// assert!(node.is_static());
/// ```
#[derive(Debug, Clone)]
pub struct Node<K, P = ()> {
    uid: K,
    position: Vector2,
    velocity: Vector2,
    acceleration: Vector2,
    mass: f64,
    charge: f64,
    radius: f64,
    is_static: bool,
    pending_force: Vector2,
    payload: P,
}

impl<K> Node<K, ()> {
    /// Create a node at `position` with default physical parameters
    pub fn new(uid: K, position: Vector2) -> Self {
        Node::with_payload(uid, position, ())
    }
}

impl<K, P> Node<K, P> {
    /// Create a node carrying a caller-defined payload
    pub fn with_payload(uid: K, position: Vector2, payload: P) -> Self {
        Node {
            uid,
            position,
            velocity: Vector2::zero(),
            acceleration: Vector2::zero(),
            mass: 1.0,
            charge: DEFAULT_CHARGE,
            radius: DEFAULT_RADIUS,
            is_static: false,
            pending_force: Vector2::zero(),
            payload,
        }
    }

    /// Replace the payload, changing its type
    pub fn payload_into<Q>(self, payload: Q) -> Node<K, Q> {
        Node {
            uid: self.uid,
            position: self.position,
            velocity: self.velocity,
            acceleration: self.acceleration,
            mass: self.mass,
            charge: self.charge,
            radius: self.radius,
            is_static: self.is_static,
            pending_force: self.pending_force,
            payload,
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the mass
    ///
    /// # Panics
    ///
    /// Panics if the mass is not strictly positive and finite. Use
    /// [`try_with_mass`](Self::try_with_mass) for fallible construction.
    pub fn with_mass(mut self, mass: f64) -> Self {
        assert!(mass > 0.0 && mass.is_finite(), "Mass must be positive and finite");
        self.mass = mass;
        self
    }

    /// Set the mass, rejecting non-positive or non-finite values
    pub fn try_with_mass(mut self, mass: f64) -> ConfigResult<Self> {
        if mass > 0.0 && mass.is_finite() {
            self.mass = mass;
            Ok(self)
        } else {
            Err(ConfigError::NotPositive { name: "mass", value: mass })
        }
    }

    /// Set the charge
    ///
    /// # Panics
    ///
    /// Panics if the charge is negative or non-finite. Opposite charges
    /// would make the repulsion denominator vanish at some separation. Use
    /// [`try_with_charge`](Self::try_with_charge) for fallible construction.
    pub fn with_charge(mut self, charge: f64) -> Self {
        assert!(charge >= 0.0 && charge.is_finite(), "Charge must be non-negative and finite");
        self.charge = charge;
        self
    }

    /// Set the charge, rejecting negative or non-finite values
    pub fn try_with_charge(mut self, charge: f64) -> ConfigResult<Self> {
        self.set_charge(charge)?;
        Ok(self)
    }

    /// Set the hit-test radius
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Pin or release the node
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// The node's identifier
    pub fn uid(&self) -> &K {
        &self.uid
    }

    /// Current position
    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Move the node, e.g. while it is dragged
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Current velocity
    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Overwrite the velocity
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    /// Acceleration accumulated in the current step (zero between steps)
    pub fn acceleration(&self) -> Vector2 {
        self.acceleration
    }

    /// Mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Charge
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Change the charge, rejecting negative or non-finite values
    pub fn set_charge(&mut self, charge: f64) -> ConfigResult<()> {
        if charge >= 0.0 && charge.is_finite() {
            self.charge = charge;
            Ok(())
        } else {
            Err(ConfigError::Negative { name: "charge", value: charge })
        }
    }

    /// Hit-test radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Change the hit-test radius
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    /// Whether the node is pinned in place
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Pin or release the node
    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
    }

    /// Sum of forces applied since the last integration
    pub fn pending_force(&self) -> Vector2 {
        self.pending_force
    }

    /// Caller payload
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Mutable caller payload
    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    /// Straight-line distance to another node
    pub fn distance_to<Q>(&self, other: &Node<K, Q>) -> f64 {
        self.position.distance(other.position)
    }

    /// Direction from this node to `other`, in radians
    ///
    /// The offset is nudged by [`ANGLE_EPSILON`] on both axes so that two
    /// nodes at the same spot still get a well-defined direction.
    pub fn angle_to<Q>(&self, other: &Node<K, Q>) -> f64 {
        let offset = other.position - self.position;
        (offset.y + ANGLE_EPSILON).atan2(offset.x + ANGLE_EPSILON)
    }

    /// Spring force acting on this node towards `other`
    ///
    /// Zero at exactly the minimum spring length, negative (pushing) when
    /// closer.
    pub fn calculate_attractive_force<Q>(&self, other: &Node<K, Q>, config: &PhysicsConfig) -> Vector2 {
        let magnitude =
            config.attractive_constant * (self.distance_to(other) - config.minimum_spring_length);
        Vector2::from_polar(magnitude, self.angle_to(other))
    }

    /// Charge repulsion acting on this node along the direction to `other`
    ///
    /// The magnitude is negative for like charges, i.e. it points away from
    /// `other`.
    pub fn calculate_repulsive_force<Q>(&self, other: &Node<K, Q>, config: &PhysicsConfig) -> Vector2 {
        let distance = self.distance_to(other).max(REPULSION_DISTANCE_FLOOR);
        let charge = self.charge * other.charge;
        let magnitude = -config.repulsive_constant * charge
            / ((distance * REPULSION_FALLOFF).powi(2) + charge);
        Vector2::from_polar(magnitude, self.angle_to(other))
    }

    /// Accumulate a force to be integrated on the next [`integrate`](Self::integrate)
    pub fn apply_force(&mut self, force: Vector2) {
        self.pending_force += force;
    }

    /// Friction opposing the current velocity (not applied)
    pub fn calculate_frictional_force(&self, config: &PhysicsConfig) -> Vector2 {
        self.velocity * (-config.friction_coefficient * self.mass)
    }

    /// Integrate one frame of motion
    ///
    /// Static nodes keep their position and velocity. Either way the
    /// acceleration and pending forces are cleared afterwards. Returns
    /// `true` if the node moved.
    pub fn integrate(&mut self, timing: &FrameTiming, config: &PhysicsConfig) -> bool
    where
        K: Debug,
    {
        let mut moved = false;

        if !self.is_static {
            let friction = self.calculate_frictional_force(config);
            self.apply_force(friction);

            let acceleration = self.acceleration + self.pending_force / self.mass;
            let velocity =
                (self.velocity + acceleration / timing.frame_rate()) * timing.friction_factor();
            let position = self.position + velocity / timing.frame_rate();

            if position.is_valid() && velocity.is_valid() {
                self.acceleration = acceleration;
                self.velocity = velocity;
                self.position = position;
                moved = true;
            } else {
                tracing::warn!(
                    node = ?self.uid,
                    "integration produced non-finite state, keeping previous position"
                );
            }
        }

        self.acceleration = Vector2::zero();
        self.pending_force = Vector2::zero();
        moved
    }

    /// Bounding-box hit test against the node's radius
    pub fn contains_point(&self, point: Vector2) -> bool {
        (point.x - self.position.x).abs() <= self.radius
            && (point.y - self.position.y).abs() <= self.radius
    }
}
