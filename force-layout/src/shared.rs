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
//! Shared graph handle and the locking contract
//!
//! The graph is protected by a single coarse lock instead of per-operation
//! locking. The simulation thread holds it for an entire tick (input,
//! physics, draw preparation), and every other thread takes it around any
//! sequence of reads or mutations that must be seen atomically.
//!
//! # Contract
//!
//! - Acquisition returns a [`GraphGuard`]; dropping it releases the lock on
//!   every exit path, including early returns and panics.
//! - Do slow work (network fetches, parsing) *outside* the lock and only lock
//!   to apply the finished result. A guard held across blocking I/O stalls
//!   the simulation.
//! - The lock is not reentrant. Locking twice on one thread deadlocks.
//! - [`SharedGraph::lock`] waits without limit. [`SharedGraph::try_lock_for`]
//!   gives up after a timeout.
//!
//! # Example
//!
//! ```
//! use force_layout::{Graph, Node, SharedGraph, Vector2};
//! use std::thread;
//!
//! let shared = SharedGraph::new(Graph::new());
//!
//! let mutator = {
//!     let shared = shared.clone();
//!     thread::spawn(move || {
//!         // Prepare outside the lock...
//!         let nodes: Vec<_> = (0..3).map(|i| Node::new(i, Vector2::new(i as f64, 0.0))).collect();
//!         // ...then apply in one short critical section
//!         let mut graph = shared.lock();
//!         for node in nodes {
//!             graph.add_node(node);
//!         }
//!         graph.add_relationship(0, 1);
//!     })
//! };
//! mutator.join().unwrap();
//!
//! assert_eq!(shared.with(|graph| graph.node_count()), 3);
//! ```

use crate::error::LockError;
use crate::graph::Graph;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

/// Cloneable handle to a graph shared between threads
pub struct SharedGraph<K, P = ()> {
    inner: Arc<Mutex<Graph<K, P>>>,
}

impl<K, P> SharedGraph<K, P> {
    /// Wrap a graph for sharing
    pub fn new(graph: Graph<K, P>) -> Self {
        SharedGraph {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Take the lock, blocking until it is free
    pub fn lock(&self) -> GraphGuard<'_, K, P> {
        GraphGuard {
            guard: self.inner.lock(),
        }
    }

    /// Take the lock only if it is free right now
    pub fn try_lock(&self) -> Option<GraphGuard<'_, K, P>> {
        self.inner.try_lock().map(|guard| GraphGuard { guard })
    }

    /// Take the lock, waiting at most `timeout`
    pub fn try_lock_for(&self, timeout: Duration) -> Result<GraphGuard<'_, K, P>, LockError> {
        match self.inner.try_lock_for(timeout) {
            Some(guard) => Ok(GraphGuard { guard }),
            None => {
                tracing::warn!(?timeout, "graph lock is still held, giving up");
                Err(LockError::Timeout(timeout))
            }
        }
    }

    /// Run `f` with the lock held and release it afterwards
    pub fn with<R>(&self, f: impl FnOnce(&mut Graph<K, P>) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Whether some thread currently holds the lock
    ///
    /// Only a hint: the answer may be stale by the time it is read.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Number of live handles to this graph
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Recover the graph if this is the last handle
    pub fn try_into_inner(self) -> Result<Graph<K, P>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| SharedGraph { inner })
    }
}

impl<K, P> Clone for SharedGraph<K, P> {
    fn clone(&self) -> Self {
        SharedGraph {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, P> From<Graph<K, P>> for SharedGraph<K, P> {
    fn from(graph: Graph<K, P>) -> Self {
        SharedGraph::new(graph)
    }
}

impl<K, P> fmt::Debug for SharedGraph<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedGraph")
            .field("locked", &self.is_locked())
            .field("handles", &self.handle_count())
            .finish()
    }
}

/// Scoped ownership of the graph lock
///
/// Dereferences to the [`Graph`]. The lock is released when the guard is
/// dropped or passed to [`unlock`](GraphGuard::unlock).
pub struct GraphGuard<'a, K, P = ()> {
    guard: MutexGuard<'a, Graph<K, P>>,
}

impl<'a, K, P> GraphGuard<'a, K, P> {
    /// Release the lock explicitly
    pub fn unlock(self) {
        drop(self);
    }
}

impl<'a, K, P> Deref for GraphGuard<'a, K, P> {
    type Target = Graph<K, P>;

    fn deref(&self) -> &Graph<K, P> {
        &self.guard
    }
}

impl<'a, K, P> DerefMut for GraphGuard<'a, K, P> {
    fn deref_mut(&mut self) -> &mut Graph<K, P> {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::vector::Vector2;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_guard_releases_on_drop() {
        let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
        {
            let mut graph = shared.lock();
            graph.add_node(Node::new(1, Vector2::zero()));
            assert!(shared.is_locked());
        }
        assert!(!shared.is_locked());
        assert!(shared.try_lock().is_some());
    }

    #[test]
    fn test_explicit_unlock() {
        let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
        let guard = shared.lock();
        assert!(shared.try_lock().is_none());
        guard.unlock();
        assert!(shared.try_lock().is_some());
    }

    #[test]
    fn test_try_lock_for_times_out() {
        let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
        let (locked_tx, locked_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let holder = {
            let shared = shared.clone();
            thread::spawn(move || {
                let _guard = shared.lock();
                locked_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            })
        };

        locked_rx.recv().unwrap();
        let result = shared.try_lock_for(Duration::from_millis(20));
        assert_eq!(result.err(), Some(LockError::Timeout(Duration::from_millis(20))));

        release_tx.send(()).unwrap();
        holder.join().unwrap();
        assert!(shared.try_lock_for(Duration::from_millis(20)).is_ok());
    }

    #[test]
    fn test_lock_released_after_panic() {
        let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
        let worker = {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut graph = shared.lock();
                graph.add_node(Node::new(7, Vector2::zero()));
                panic!("collaborator failed mid-frame");
            })
        };
        assert!(worker.join().is_err());

        // parking_lot does not poison, so the mutation before the panic is visible
        let graph = shared.try_lock_for(Duration::from_millis(100)).unwrap();
        assert!(graph.contains_node(&7));
    }

    #[test]
    fn test_with_and_into_inner() {
        let shared: SharedGraph<u32> = Graph::new().into();
        let other = shared.clone();
        assert_eq!(shared.handle_count(), 2);

        shared.with(|graph| {
            graph.add_node(Node::new(1, Vector2::zero()));
        });

        let shared = shared.try_into_inner().unwrap_err();
        drop(other);
        let graph = shared.try_into_inner().unwrap();
        assert_eq!(graph.node_count(), 1);
    }
}
