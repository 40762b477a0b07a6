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
//! Graph topology and the physics step
//!
//! The graph owns every node and a directed relationship index. Each node
//! has one adjacency record holding the identifiers it points to
//! (`outgoing`) and the identifiers pointing at it (`incoming`).
//!
//! # Invariants
//!
//! - A key is in the adjacency index iff it is in the node map.
//! - `b ∈ outgoing(a)` iff `a ∈ incoming(b)`, each exactly once.
//! - No self-loops, no dangling identifiers.
//!
//! Every mutation keeps these true. Misuse (missing endpoints, duplicates,
//! self-loops) is logged and ignored so that racy callers cannot bring down
//! the simulation thread.
//!
//! # Physics Step
//!
//! One step runs three passes: attraction along every relationship,
//! repulsion between every unordered pair, then integration of every node.
//! Both force passes finish before any node moves. The repulsive pass is
//! quadratic in the node count; with the `parallel` feature the per-node
//! sums are spread across Rayon workers.

use crate::config::PhysicsConfig;
use crate::error::{TopologyError, TopologyResult};
use crate::node::Node;
use crate::timing::FrameTiming;
use crate::vector::Vector2;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Thread-safety required of identifiers and payloads by the physics step
///
/// With the `parallel` feature the repulsive pass shares nodes across Rayon
/// workers, so `K` and `P` must be `Send + Sync`. Without it every type
/// qualifies.
#[cfg(feature = "parallel")]
pub trait StepSafe: Send + Sync {}

#[cfg(feature = "parallel")]
impl<T: Send + Sync> StepSafe for T {}

/// Thread-safety required of identifiers and payloads by the physics step
///
/// With the `parallel` feature the repulsive pass shares nodes across Rayon
/// workers, so `K` and `P` must be `Send + Sync`. Without it every type
/// qualifies.
#[cfg(not(feature = "parallel"))]
pub trait StepSafe {}

#[cfg(not(feature = "parallel"))]
impl<T> StepSafe for T {}

/// Relationship record of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency<K> {
    outgoing: Vec<K>,
    incoming: Vec<K>,
}

impl<K> Adjacency<K> {
    fn new() -> Self {
        Adjacency {
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Nodes this node points to
    pub fn outgoing(&self) -> &[K] {
        &self.outgoing
    }

    /// Nodes pointing at this node
    pub fn incoming(&self) -> &[K] {
        &self.incoming
    }

    /// Total number of relationships touching the node
    pub fn degree(&self) -> usize {
        self.outgoing.len() + self.incoming.len()
    }
}

/// Side-channel store for caller-defined graph data
///
/// Holds at most one value per type. The engine never reads it.
#[derive(Default)]
pub struct GraphData {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl GraphData {
    /// Store a value, returning the previous value of the same type
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Borrow the value of type `T`
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Mutably borrow the value of type `T`
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.values.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// Take the value of type `T` out of the store
    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for GraphData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphData").field("len", &self.values.len()).finish()
    }
}

/// What one physics step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Relationships that produced a spring force
    pub relationships: usize,
    /// Unordered node pairs that produced a repulsive force
    pub pairs: usize,
    /// Nodes whose position was integrated
    pub moved: usize,
}

/// A directed graph laid out by a force simulation
///
/// # Example
///
/// ```
/// use force_layout::{Graph, Node, Vector2};
///
/// let mut graph = Graph::new();
/// graph.add_node(Node::new("a", Vector2::new(0.0, 0.0)));
/// graph.add_node(Node::new("b", Vector2::new(200.0, 0.0)));
/// assert!(graph.add_relationship("a", "b"));
///
/// let before = graph.node(&"a").unwrap().distance_to(graph.node(&"b").unwrap());
/// graph.run_physics_step(50.0);
/// let after = graph.node(&"a").unwrap().distance_to(graph.node(&"b").unwrap());
/// assert!(after < before);
/// ```
#[derive(Debug)]
pub struct Graph<K, P = ()> {
    nodes: HashMap<K, Node<K, P>>,
    relationships: HashMap<K, Adjacency<K>>,
    config: PhysicsConfig,
    data: GraphData,
}

impl<K, P> Graph<K, P>
where
    K: Eq + Hash + Clone + Debug + StepSafe,
    P: StepSafe,
{
    /// Create an empty graph with the default force constants
    pub fn new() -> Self {
        Graph::with_config(PhysicsConfig::default())
    }

    /// Create an empty graph with the given force constants
    pub fn with_config(config: PhysicsConfig) -> Self {
        Graph {
            nodes: HashMap::new(),
            relationships: HashMap::new(),
            config,
            data: GraphData::default(),
        }
    }

    /// Build a graph from a node set and a relationship list
    ///
    /// Relationships go through [`add_relationship`](Self::add_relationship),
    /// so invalid ones are logged and skipped.
    pub fn from_parts<N, E>(config: PhysicsConfig, nodes: N, relationships: E) -> Self
    where
        N: IntoIterator<Item = Node<K, P>>,
        E: IntoIterator<Item = (K, K)>,
    {
        let mut graph = Graph::with_config(config);
        for node in nodes {
            graph.add_node(node);
        }
        for (outgoing, incoming) in relationships {
            graph.add_relationship(outgoing, incoming);
        }
        graph
    }

    /// Force constants used by the next step
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Tune the force constants; changes apply from the next step
    pub fn config_mut(&mut self) -> &mut PhysicsConfig {
        &mut self.config
    }

    /// Caller-defined side-channel data
    pub fn data(&self) -> &GraphData {
        &self.data
    }

    /// Mutable caller-defined side-channel data
    pub fn data_mut(&mut self) -> &mut GraphData {
        &mut self.data
    }

    /// Add a node, replacing any node with the same identifier
    ///
    /// A replaced node is removed completely first, including all of its
    /// relationships, and handed back.
    pub fn add_node(&mut self, node: Node<K, P>) -> Option<Node<K, P>> {
        let replaced = if self.nodes.contains_key(node.uid()) {
            tracing::debug!(node = ?node.uid(), "replacing existing node and its relationships");
            self.remove_node(node.uid())
        } else {
            None
        };

        let uid = node.uid().clone();
        self.relationships.insert(uid.clone(), Adjacency::new());
        self.nodes.insert(uid, node);
        replaced
    }

    /// Remove a node and every relationship touching it
    ///
    /// Logs and returns `None` if the node does not exist.
    pub fn remove_node(&mut self, uid: &K) -> Option<Node<K, P>> {
        match self.try_remove_node(uid) {
            Ok(node) => Some(node),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring node removal");
                None
            }
        }
    }

    /// Remove a node and every relationship touching it, reporting misuse
    pub fn try_remove_node(&mut self, uid: &K) -> TopologyResult<Node<K, P>> {
        let adjacency = self
            .relationships
            .get(uid)
            .cloned()
            .ok_or_else(|| TopologyError::missing_node(uid))?;

        for target in &adjacency.outgoing {
            self.try_remove_relationship(uid, target)?;
        }
        for source in &adjacency.incoming {
            self.try_remove_relationship(source, uid)?;
        }

        self.relationships.remove(uid);
        self.nodes
            .remove(uid)
            .ok_or_else(|| TopologyError::missing_node(uid))
    }

    /// Add the directed relationship `outgoing > incoming`
    ///
    /// Returns `false` and logs when an endpoint is missing, the endpoints
    /// are the same node, or the relationship already exists.
    pub fn add_relationship(&mut self, outgoing: K, incoming: K) -> bool {
        match self.try_add_relationship(outgoing, incoming) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring relationship");
                false
            }
        }
    }

    /// Add the directed relationship `outgoing > incoming`, reporting misuse
    pub fn try_add_relationship(&mut self, outgoing: K, incoming: K) -> TopologyResult<()> {
        self.check_endpoints(&outgoing, &incoming)?;
        if outgoing == incoming {
            return Err(TopologyError::self_loop(&outgoing));
        }
        if self.has_relationship(&outgoing, &incoming) {
            let (source_id, target_id) = TopologyError::endpoints(&outgoing, &incoming);
            return Err(TopologyError::DuplicateRelationship { source_id, target_id });
        }

        if let Some(adjacency) = self.relationships.get_mut(&outgoing) {
            adjacency.outgoing.push(incoming.clone());
        }
        if let Some(adjacency) = self.relationships.get_mut(&incoming) {
            adjacency.incoming.push(outgoing);
        }
        Ok(())
    }

    /// Remove the directed relationship `outgoing > incoming`
    ///
    /// Returns `false` and logs when an endpoint or the relationship itself
    /// is missing.
    pub fn remove_relationship(&mut self, outgoing: &K, incoming: &K) -> bool {
        match self.try_remove_relationship(outgoing, incoming) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring relationship removal");
                false
            }
        }
    }

    /// Remove the directed relationship `outgoing > incoming`, reporting misuse
    pub fn try_remove_relationship(&mut self, outgoing: &K, incoming: &K) -> TopologyResult<()> {
        self.check_endpoints(outgoing, incoming)?;
        if !self.has_relationship(outgoing, incoming) {
            let (source_id, target_id) = TopologyError::endpoints(outgoing, incoming);
            return Err(TopologyError::MissingRelationship { source_id, target_id });
        }

        if let Some(adjacency) = self.relationships.get_mut(outgoing) {
            if let Some(index) = adjacency.outgoing.iter().position(|k| k == incoming) {
                adjacency.outgoing.remove(index);
            }
        }
        if let Some(adjacency) = self.relationships.get_mut(incoming) {
            if let Some(index) = adjacency.incoming.iter().position(|k| k == outgoing) {
                adjacency.incoming.remove(index);
            }
        }
        Ok(())
    }

    fn check_endpoints(&self, outgoing: &K, incoming: &K) -> TopologyResult<()> {
        if !self.relationships.contains_key(outgoing) {
            let (source_id, target_id) = TopologyError::endpoints(outgoing, incoming);
            return Err(TopologyError::MissingSource { source_id, target_id });
        }
        if !self.relationships.contains_key(incoming) {
            let (source_id, target_id) = TopologyError::endpoints(outgoing, incoming);
            return Err(TopologyError::MissingTarget { source_id, target_id });
        }
        Ok(())
    }

    /// Whether `outgoing > incoming` exists
    pub fn has_relationship(&self, outgoing: &K, incoming: &K) -> bool {
        self.relationships
            .get(outgoing)
            .map_or(false, |adjacency| adjacency.outgoing.contains(incoming))
    }

    /// Whether a node with this identifier exists
    pub fn contains_node(&self, uid: &K) -> bool {
        self.nodes.contains_key(uid)
    }

    /// Look up a node
    pub fn node(&self, uid: &K) -> Option<&Node<K, P>> {
        self.nodes.get(uid)
    }

    /// Look up a node for modification
    pub fn node_mut(&mut self, uid: &K) -> Option<&mut Node<K, P>> {
        self.nodes.get_mut(uid)
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node<K, P>> {
        self.nodes.values()
    }

    /// Iterate mutably over all nodes
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node<K, P>> {
        self.nodes.values_mut()
    }

    /// Adjacency record of a node
    pub fn adjacency(&self, uid: &K) -> Option<&Adjacency<K>> {
        self.relationships.get(uid)
    }

    /// Nodes that `uid` points to (empty if `uid` is absent)
    pub fn outgoing(&self, uid: &K) -> &[K] {
        self.relationships.get(uid).map(|a| a.outgoing()).unwrap_or(&[])
    }

    /// Nodes pointing at `uid` (empty if `uid` is absent)
    pub fn incoming(&self, uid: &K) -> &[K] {
        self.relationships.get(uid).map(|a| a.incoming()).unwrap_or(&[])
    }

    /// Number of relationships touching `uid`
    pub fn degree(&self, uid: &K) -> usize {
        self.relationships.get(uid).map_or(0, Adjacency::degree)
    }

    /// Iterate over every relationship as `(outgoing, incoming)`
    pub fn relationships(&self) -> impl Iterator<Item = (&K, &K)> {
        self.relationships
            .iter()
            .flat_map(|(source, adjacency)| adjacency.outgoing.iter().map(move |target| (source, target)))
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.values().map(|a| a.outgoing.len()).sum()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node whose hit box contains `point`
    pub fn find_colliding_node(&self, point: Vector2) -> Option<&K> {
        self.nodes
            .values()
            .find(|node| node.contains_point(point))
            .map(Node::uid)
    }

    /// Pin or release a node, returning its previous static flag
    pub fn set_static(&mut self, uid: &K, is_static: bool) -> Option<bool> {
        let node = self.nodes.get_mut(uid)?;
        let previous = node.is_static();
        node.set_static(is_static);
        Some(previous)
    }

    /// Remove every node and relationship, keeping config and side data
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.relationships.clear();
    }

    /// Check every topology invariant
    ///
    /// Mutations keep the graph consistent, so this only returns `false` if
    /// something has gone badly wrong. Intended for assertions and tests.
    pub fn is_consistent(&self) -> bool {
        if self.nodes.len() != self.relationships.len() {
            return false;
        }

        self.relationships.iter().all(|(uid, adjacency)| {
            self.nodes.contains_key(uid)
                && adjacency.outgoing.iter().all(|target| {
                    target != uid
                        && adjacency.outgoing.iter().filter(|k| *k == target).count() == 1
                        && self.relationships.get(target).map_or(false, |other| {
                            other.incoming.iter().filter(|k| *k == uid).count() == 1
                        })
                })
                && adjacency.incoming.iter().all(|source| {
                    self.relationships
                        .get(source)
                        .map_or(false, |other| other.outgoing.contains(uid))
                })
        })
    }

    /// Run one physics step at `frame_rate` ticks per second
    ///
    /// The per-frame friction factor is derived from the configured friction
    /// coefficient and `frame_rate`.
    pub fn run_physics_step(&mut self, frame_rate: f64) -> StepStats {
        let timing = FrameTiming::new(frame_rate, self.config.friction_coefficient);
        self.step(&timing)
    }

    /// Run one physics step with explicit timing
    ///
    /// An unusable frame rate (zero, negative or non-finite) leaves the graph
    /// untouched.
    pub fn step(&mut self, timing: &FrameTiming) -> StepStats {
        if !timing.is_valid() {
            tracing::warn!(
                frame_rate = timing.frame_rate(),
                "skipping physics step with invalid frame rate"
            );
            return StepStats::default();
        }

        let mut stats = StepStats::default();

        let attractive = self.attractive_forces();
        stats.relationships = attractive.len();
        for (source, target, force) in attractive {
            if let Some(node) = self.nodes.get_mut(&source) {
                node.apply_force(force);
            }
            if let Some(node) = self.nodes.get_mut(&target) {
                node.apply_force(-force);
            }
        }

        let (repulsive, pairs) = self.repulsive_forces();
        stats.pairs = pairs;
        for (uid, force) in repulsive {
            if let Some(node) = self.nodes.get_mut(&uid) {
                node.apply_force(force);
            }
        }

        let config = self.config;
        for node in self.nodes.values_mut() {
            if node.integrate(timing, &config) {
                stats.moved += 1;
            }
        }

        tracing::trace!(
            relationships = stats.relationships,
            pairs = stats.pairs,
            moved = stats.moved,
            "physics step complete"
        );
        stats
    }

    /// Spring force on the source of every relationship; the target receives
    /// the negation
    fn attractive_forces(&self) -> Vec<(K, K, Vector2)> {
        let mut forces = Vec::new();
        for (source, adjacency) in &self.relationships {
            let Some(from) = self.nodes.get(source) else { continue };
            for target in &adjacency.outgoing {
                let Some(to) = self.nodes.get(target) else { continue };
                let force = from.calculate_attractive_force(to, &self.config);
                forces.push((source.clone(), target.clone(), force));
            }
        }
        forces
    }

    /// Net repulsive force on every node and the number of pairs considered
    ///
    /// For a pair `(i, j)` with `i` before `j`, `i` receives
    /// `i.repel(j)` and `j` receives its negation.
    #[cfg(not(feature = "parallel"))]
    fn repulsive_forces(&self) -> (Vec<(K, Vector2)>, usize) {
        let nodes: Vec<&Node<K, P>> = self.nodes.values().collect();
        let mut forces = vec![Vector2::zero(); nodes.len()];

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let force = nodes[i].calculate_repulsive_force(nodes[j], &self.config);
                forces[i] += force;
                forces[j] -= force;
            }
        }

        let pairs = pair_count(nodes.len());
        let forces = nodes
            .iter()
            .zip(forces)
            .map(|(node, force)| (node.uid().clone(), force))
            .collect();
        (forces, pairs)
    }

    /// Net repulsive force on every node and the number of pairs considered
    ///
    /// Each node sums its own column of the pair matrix, so the terms match
    /// the sequential pass exactly: `i.repel(j)` for later nodes and
    /// `-j.repel(i)` for earlier ones.
    #[cfg(feature = "parallel")]
    fn repulsive_forces(&self) -> (Vec<(K, Vector2)>, usize) {
        let nodes: Vec<&Node<K, P>> = self.nodes.values().collect();
        let config = &self.config;

        let forces = (0..nodes.len())
            .into_par_iter()
            .map(|i| {
                let mut total = Vector2::zero();
                for (j, other) in nodes.iter().enumerate() {
                    if j < i {
                        total -= other.calculate_repulsive_force(nodes[i], config);
                    } else if j > i {
                        total += nodes[i].calculate_repulsive_force(other, config);
                    }
                }
                (nodes[i].uid().clone(), total)
            })
            .collect();

        (forces, pair_count(nodes.len()))
    }
}

fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

impl<K, P> Default for Graph<K, P>
where
    K: Eq + Hash + Clone + Debug + StepSafe,
    P: StepSafe,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(uid: &'static str, x: f64, y: f64) -> Node<&'static str> {
        Node::new(uid, Vector2::new(x, y))
    }

    fn triangle() -> Graph<&'static str> {
        Graph::from_parts(
            PhysicsConfig::default(),
            vec![node("a", 0.0, 0.0), node("b", 100.0, 0.0), node("c", 0.0, 100.0)],
            vec![("a", "b"), ("b", "c"), ("c", "a")],
        )
    }

    #[test]
    fn test_graph_creation() {
        let graph: Graph<u32> = Graph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.relationship_count(), 0);
        assert!(graph.is_empty());
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_from_parts() {
        let graph = triangle();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.relationship_count(), 3);
        assert_eq!(graph.outgoing(&"a"), &["b"]);
        assert_eq!(graph.incoming(&"a"), &["c"]);
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_from_parts_skips_invalid_relationships() {
        let graph = Graph::from_parts(
            PhysicsConfig::default(),
            vec![node("a", 0.0, 0.0), node("b", 1.0, 0.0)],
            vec![("a", "b"), ("a", "b"), ("a", "a"), ("a", "zzz")],
        );
        assert_eq!(graph.relationship_count(), 1);
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_add_relationship_errors() {
        let mut graph = triangle();
        assert!(matches!(
            graph.try_add_relationship("a", "b"),
            Err(TopologyError::DuplicateRelationship { .. })
        ));
        assert!(matches!(
            graph.try_add_relationship("a", "a"),
            Err(TopologyError::SelfLoop(_))
        ));
        assert!(matches!(
            graph.try_add_relationship("x", "a"),
            Err(TopologyError::MissingSource { .. })
        ));
        assert!(matches!(
            graph.try_add_relationship("a", "x"),
            Err(TopologyError::MissingTarget { .. })
        ));
        assert_eq!(graph.relationship_count(), 3);
    }

    #[test]
    fn test_reverse_relationship_is_distinct() {
        let mut graph = triangle();
        assert!(graph.add_relationship("b", "a"));
        assert!(graph.has_relationship(&"a", &"b"));
        assert!(graph.has_relationship(&"b", &"a"));
        assert_eq!(graph.degree(&"a"), 3);
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_remove_relationship() {
        let mut graph = triangle();
        assert!(graph.remove_relationship(&"a", &"b"));
        assert!(!graph.has_relationship(&"a", &"b"));
        assert!(graph.incoming(&"b").is_empty());

        assert!(matches!(
            graph.try_remove_relationship(&"a", &"b"),
            Err(TopologyError::MissingRelationship { .. })
        ));
        assert!(!graph.remove_relationship(&"a", &"nope"));
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut graph = triangle();
        let removed = graph.remove_node(&"a").unwrap();
        assert_eq!(removed.uid(), &"a");
        assert!(!graph.contains_node(&"a"));
        assert!(graph.adjacency(&"a").is_none());
        assert_eq!(graph.relationship_count(), 1);
        assert!(graph.incoming(&"b").is_empty());
        assert!(graph.outgoing(&"c").is_empty());
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_remove_missing_node() {
        let mut graph = triangle();
        assert!(graph.remove_node(&"nope").is_none());
        assert_eq!(
            graph.try_remove_node(&"nope").unwrap_err(),
            TopologyError::MissingNode("\"nope\"".to_string())
        );
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_add_node_replaces_and_resets() {
        let mut graph = triangle();
        let replaced = graph.add_node(node("a", 50.0, 50.0)).unwrap();
        assert_eq!(replaced.position(), Vector2::zero());
        assert_eq!(graph.node(&"a").unwrap().position(), Vector2::new(50.0, 50.0));
        assert_eq!(graph.degree(&"a"), 0);
        assert_eq!(graph.relationship_count(), 1);
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_relationships_iterator() {
        let graph = triangle();
        let mut edges: Vec<(&str, &str)> = graph.relationships().map(|(a, b)| (*a, *b)).collect();
        edges.sort();
        assert_eq!(edges, vec![("a", "b"), ("b", "c"), ("c", "a")]);
    }

    #[test]
    fn test_find_colliding_node() {
        let graph = triangle();
        assert_eq!(graph.find_colliding_node(Vector2::new(98.0, 3.0)), Some(&"b"));
        assert_eq!(graph.find_colliding_node(Vector2::new(50.0, 50.0)), None);
    }

    #[test]
    fn test_set_static() {
        let mut graph = triangle();
        assert_eq!(graph.set_static(&"a", true), Some(false));
        assert_eq!(graph.set_static(&"a", false), Some(true));
        assert_eq!(graph.set_static(&"nope", true), None);
    }

    #[test]
    fn test_graph_data() {
        #[derive(Debug, Default, PartialEq)]
        struct CrawlQueue(Vec<String>);

        let mut graph = triangle();
        assert!(graph.data().is_empty());
        graph.data_mut().insert(CrawlQueue::default());
        graph.data_mut().get_mut::<CrawlQueue>().unwrap().0.push("next".into());
        assert_eq!(graph.data_mut().insert(42u32), None);
        assert_eq!(graph.data_mut().insert(43u32), Some(42));

        assert_eq!(graph.data().get::<u32>(), Some(&43));
        assert_eq!(graph.data().get::<CrawlQueue>().unwrap().0, vec!["next".to_string()]);
        assert_eq!(graph.data_mut().remove::<u32>(), Some(43));
        assert_eq!(graph.data().len(), 1);
    }

    #[test]
    fn test_clear_keeps_config() {
        let mut graph = triangle();
        graph.config_mut().attractive_constant = 1.0;
        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.relationship_count(), 0);
        assert_eq!(graph.config().attractive_constant, 1.0);
    }

    #[test]
    fn test_step_counts() {
        let mut graph = triangle();
        let stats = graph.run_physics_step(50.0);
        assert_eq!(
            stats,
            StepStats {
                relationships: 3,
                pairs: 3,
                moved: 3,
            }
        );
    }

    #[test]
    fn test_step_rejects_invalid_frame_rate() {
        let mut graph = triangle();
        let stats = graph.run_physics_step(0.0);
        assert_eq!(stats, StepStats::default());
        assert_eq!(graph.node(&"b").unwrap().position(), Vector2::new(100.0, 0.0));
    }

    #[test]
    fn test_step_on_empty_graph() {
        let mut graph: Graph<u32> = Graph::new();
        assert_eq!(graph.run_physics_step(50.0), StepStats::default());
    }

    #[test]
    fn test_nodes_mut_edits_every_node() {
        let mut graph = triangle();
        for node in graph.nodes_mut() {
            let shifted = node.position() + Vector2::new(10.0, 0.0);
            node.set_position(shifted);
        }
        assert_eq!(graph.node(&"a").unwrap().position(), Vector2::new(10.0, 0.0));
        assert_eq!(graph.node(&"c").unwrap().position(), Vector2::new(10.0, 100.0));
        assert!(graph.is_consistent());
    }
}
