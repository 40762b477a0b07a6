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
//! Concurrency tests
//!
//! Mutator threads hammer a graph while a simulation ticks on its own
//! thread. Every observation taken under the lock must see a consistent
//! topology.

use force_layout::{
    DriverConfig, EventQueue, Graph, InteractionEvent, Node, SharedGraph, Simulation, TickHooks,
    Vector2,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn fast_config() -> DriverConfig {
    DriverConfig::default().with_target_frame_rate(500.0)
}

#[test]
fn test_mutators_and_simulation_keep_graph_consistent() {
    let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
    let handle = Simulation::new(shared.clone(), fast_config())
        .unwrap()
        .spawn()
        .unwrap();

    let mutators: Vec<_> = (0..4u32)
        .map(|t| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..200u32 {
                    let uid = t * 1_000 + i;
                    // Build the node before taking the lock
                    let node = Node::new(uid, Vector2::new(i as f64, t as f64 * 50.0));
                    let mut graph = shared.lock();
                    graph.add_node(node);
                    if i > 0 {
                        graph.add_relationship(uid, uid - 1);
                    }
                    if i % 7 == 0 && i > 10 {
                        graph.remove_node(&(uid - 5));
                    }
                    if i % 11 == 0 {
                        // Cross-thread edge; may or may not exist yet
                        graph.add_relationship(uid, ((t + 1) % 4) * 1_000 + i);
                    }
                    assert!(graph.is_consistent());
                }
            })
        })
        .collect();

    for mutator in mutators {
        mutator.join().unwrap();
    }

    let simulation = handle.join().unwrap();
    assert!(simulation.tick_count() > 0);

    let graph = shared.lock();
    assert!(graph.is_consistent());
    assert!(graph.nodes().all(|n| n.position().is_valid()));
    assert!(graph.node_count() > 0);
}

#[test]
fn test_stop_is_observed_promptly() {
    let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
    shared.with(|graph| {
        graph.add_node(Node::new(1, Vector2::zero()));
    });

    let handle = Simulation::new(shared, fast_config())
        .unwrap()
        .spawn()
        .unwrap();
    let stop = handle.stop_flag();

    thread::sleep(Duration::from_millis(20));
    stop.request_stop();
    for _ in 0..100 {
        if handle.is_finished() {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert!(handle.is_finished());

    let simulation = handle.join().unwrap();
    let ticks = simulation.tick_count();
    assert!(ticks > 0);
}

#[test]
fn test_held_lock_stalls_untimed_driver() {
    let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
    let ticks = Arc::new(AtomicUsize::new(0));

    struct Counter(Arc<AtomicUsize>);
    impl TickHooks<u32, ()> for Counter {
        fn after_physics(&mut self, _graph: &Graph<u32>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let guard = shared.lock();
    let handle = Simulation::new(shared.clone(), fast_config())
        .unwrap()
        .with_hooks(Counter(Arc::clone(&ticks)))
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(ticks.load(Ordering::SeqCst), 0);

    guard.unlock();
    thread::sleep(Duration::from_millis(50));
    assert!(ticks.load(Ordering::SeqCst) > 0);

    handle.join().unwrap();
}

#[test]
fn test_lock_timeout_skips_ticks() {
    let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
    let config = fast_config().with_lock_timeout(Duration::from_millis(2));

    let guard = shared.lock();
    let handle = Simulation::new(shared.clone(), config)
        .unwrap()
        .spawn()
        .unwrap();
    thread::sleep(Duration::from_millis(50));
    guard.unlock();
    thread::sleep(Duration::from_millis(20));

    let simulation = handle.join().unwrap();
    assert!(simulation.skipped_ticks() > 0);
    assert!(simulation.tick_count() > 0);
}

/// Input collaborator: pins whatever node the "pointer" is over and reports it
struct PinUnderPointer {
    pointer: Vector2,
    events: EventQueue<InteractionEvent<u32>>,
}

impl TickHooks<u32, ()> for PinUnderPointer {
    fn before_physics(&mut self, graph: &mut Graph<u32>) {
        if let Some(uid) = graph.find_colliding_node(self.pointer).copied() {
            if graph.set_static(&uid, true) == Some(false) {
                self.events.push(InteractionEvent::Pressed { button: 1, node: Some(uid) });
            }
        }
    }
}

#[test]
fn test_hooks_mutate_and_report_under_lock() {
    let shared: SharedGraph<u32> = SharedGraph::new(Graph::new());
    shared.with(|graph| {
        graph.add_node(Node::new(1, Vector2::new(100.0, 100.0)));
        graph.add_node(Node::new(2, Vector2::new(130.0, 100.0)));
    });

    let events = EventQueue::new();
    let hooks = PinUnderPointer {
        pointer: Vector2::new(102.0, 98.0),
        events: events.clone(),
    };
    let handle = Simulation::new(shared.clone(), fast_config())
        .unwrap()
        .with_hooks(hooks)
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    handle.join().unwrap();

    let drained = events.drain();
    assert_eq!(drained, vec![InteractionEvent::Pressed { button: 1, node: Some(1) }]);
    shared.with(|graph| {
        assert_eq!(graph.node(&1).unwrap().position(), Vector2::new(100.0, 100.0));
        assert!(graph.node(&2).unwrap().position().x > 130.0);
    });
}
