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
//! Crawler example demonstrating live graph growth
//!
//! A simulated crawler discovers "pages" on worker threads. Each fetch
//! happens outside the graph lock; only the finished result is applied
//! under it. An input collaborator "clicks" a page every so often, which
//! queues an interaction event for the main thread to act on.
//!
//! Run with `RUST_LOG=force_layout=debug` to see the periodic timing reports.

use force_layout::{
    DriverConfig, EventQueue, Graph, InteractionEvent, Node, SharedGraph, Simulation, TickHooks,
    Vector2,
};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
enum CrawlStatus {
    Uncrawled,
    Crawling,
    Crawled,
}

/// Per-page payload carried by each node
#[derive(Debug, Clone)]
struct Page {
    status: CrawlStatus,
    /// Links found on the page that have not been added yet
    pending: Vec<String>,
    link_count: usize,
}

impl Page {
    fn new() -> Self {
        Page {
            status: CrawlStatus::Uncrawled,
            pending: Vec::new(),
            link_count: 0,
        }
    }
}

/// Largest link count seen so far, kept in the graph's side data
#[derive(Debug, Default)]
struct MostLinks(usize);

// Stand-in for a network fetch: deterministic fake links plus latency
fn fetch_links(page: &str) -> Vec<String> {
    thread::sleep(Duration::from_millis(30));
    let fanout = 3 + page.len() % 5;
    (0..fanout).map(|i| format!("{}/{}", page, i)).collect()
}

fn add_child(graph: &mut Graph<String, Page>, name: String, parent: &str) {
    let Some(origin) = graph.node(&parent.to_string()).map(|n| n.position()) else {
        return;
    };
    let node = Node::with_payload(name.clone(), origin + Vector2::new(30.0, 30.0), Page::new());
    graph.add_node(node);
    graph.add_relationship(name, parent.to_string());
}

fn crawl(shared: SharedGraph<String, Page>, page: String) {
    tracing::info!(%page, "crawling");
    shared.with(|graph| {
        if let Some(node) = graph.node_mut(&page) {
            node.payload_mut().status = CrawlStatus::Crawling;
        }
    });

    let links = fetch_links(&page);

    let mut graph = shared.lock();
    let Some(node) = graph.node_mut(&page) else {
        tracing::warn!(%page, "page vanished while crawling");
        return;
    };
    let payload = node.payload_mut();
    payload.status = CrawlStatus::Crawled;
    payload.link_count = links.len();
    payload.pending = links;
    let count = payload.link_count;

    let most = graph.data().get::<MostLinks>().map_or(0, |m| m.0);
    if count > most {
        graph.data_mut().insert(MostLinks(count));
    }

    for _ in 0..3 {
        spawn_pending(&mut graph, &page);
    }
}

// Turn the next pending link of `parent` into a node, skipping known pages
fn spawn_pending(graph: &mut Graph<String, Page>, parent: &str) {
    loop {
        let next = match graph.node_mut(&parent.to_string()) {
            Some(node) if !node.payload().pending.is_empty() => node.payload_mut().pending.remove(0),
            _ => return,
        };
        if !graph.contains_node(&next) {
            add_child(graph, next, parent);
            return;
        }
    }
}

/// Clicks the nodes sitting under a scripted pointer path
struct ScriptedPointer {
    path: Vec<Vector2>,
    tick: usize,
    events: EventQueue<InteractionEvent<String>>,
}

impl TickHooks<String, Page> for ScriptedPointer {
    fn before_physics(&mut self, graph: &mut Graph<String, Page>) {
        self.tick += 1;
        if self.tick % 25 != 0 {
            return;
        }
        let pointer = self.path[(self.tick / 25) % self.path.len()];
        let node = graph.find_colliding_node(pointer).cloned();
        self.events.push(InteractionEvent::Pressed { button: 3, node });
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Force Layout - Crawler Example");
    println!("==============================\n");

    let config = DriverConfig::default();
    let center = config.viewport.center();

    let shared: SharedGraph<String, Page> = SharedGraph::new(Graph::new());
    shared.with(|graph| {
        let root = Node::with_payload("root".to_string(), center, Page::new()).with_static(true);
        graph.add_node(root);
    });

    let events = EventQueue::new();
    let pointer = ScriptedPointer {
        path: vec![center, center + Vector2::new(30.0, 30.0), center + Vector2::new(-40.0, 60.0)],
        tick: 0,
        events: events.clone(),
    };

    let handle = Simulation::new(shared.clone(), config)
        .expect("default config is valid")
        .with_hooks(pointer)
        .spawn()
        .expect("failed to start simulation thread");

    crawl(shared.clone(), "root".to_string());

    let mut workers = Vec::new();
    for _ in 0..40 {
        thread::sleep(Duration::from_millis(50));
        for event in events.drain() {
            let InteractionEvent::Pressed { node: Some(page), .. } = event else {
                continue;
            };
            let status = shared.with(|graph| graph.node(&page).map(|n| n.payload().status.clone()));
            match status {
                Some(CrawlStatus::Uncrawled) => {
                    let shared = shared.clone();
                    workers.push(thread::spawn(move || crawl(shared, page)));
                }
                Some(CrawlStatus::Crawled) => {
                    // Clicking a crawled page reveals one more of its links
                    let mut graph = shared.lock();
                    spawn_pending(&mut graph, &page);
                }
                _ => {}
            }
        }
    }

    for worker in workers {
        let _ = worker.join();
    }
    let simulation = handle.join().expect("simulation thread panicked");

    let graph = shared.lock();
    println!("Ticks: {}", simulation.tick_count());
    println!("Effective frame rate: {:.1}", simulation.effective_frame_rate());
    println!("Pages: {}", graph.node_count());
    println!("Links: {}", graph.relationship_count());
    println!(
        "Most links on one page: {}",
        graph.data().get::<MostLinks>().map_or(0, |m| m.0)
    );
    for node in graph.nodes().take(10) {
        println!(
            "  {:<16} {:?} at {}",
            node.uid(),
            node.payload().status,
            node.position()
        );
    }
}
