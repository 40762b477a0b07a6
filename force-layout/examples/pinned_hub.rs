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
//! Pinned hub example
//!
//! Steps a star graph by hand, without the driver thread, and prints how the
//! spokes settle around a pinned hub.

use force_layout::{Graph, Node, PhysicsConfig, Vector2};

fn main() {
    println!("Force Layout - Pinned Hub Example");
    println!("=================================\n");

    let config = PhysicsConfig::default().with_minimum_spring_length(80.0);
    let hub = Vector2::new(400.0, 300.0);

    let mut graph: Graph<u32> = Graph::with_config(config);
    graph.add_node(Node::new(0, hub).with_static(true));
    for i in 1..=8 {
        // Start every spoke bunched up just right of the hub
        graph.add_node(Node::new(i, hub + Vector2::new(5.0, i as f64)));
        graph.add_relationship(i, 0);
    }

    let frame_rate = 50.0;
    for second in 0..=5 {
        let mean = graph
            .nodes()
            .filter(|n| !n.is_static())
            .map(|n| n.position().distance(hub))
            .sum::<f64>()
            / 8.0;
        let fastest = graph
            .nodes()
            .map(|n| n.velocity().magnitude())
            .fold(0.0, f64::max);
        println!(
            "t={}s  mean spoke length {:>7.2}  fastest node {:>8.3}",
            second, mean, fastest
        );

        for _ in 0..frame_rate as usize {
            graph.run_physics_step(frame_rate);
        }
    }

    println!("\nHub stayed at {}", graph.node(&0).map(|n| n.position()).unwrap_or_default());
}
