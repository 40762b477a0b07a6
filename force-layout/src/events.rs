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
//! Interaction event queue
//!
//! The input collaborator pushes events from inside a tick, and the
//! application drains them from its own thread whenever it likes. Draining
//! consumes: each event is delivered once.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A pointer interaction, optionally over a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent<K> {
    /// A button went down
    Pressed {
        /// Button number, 1 being the primary button
        button: u8,
        /// Node under the pointer, if any
        node: Option<K>,
    },
    /// A button came up
    Released {
        /// Button number, 1 being the primary button
        button: u8,
        /// Node under the pointer, if any
        node: Option<K>,
    },
}

impl<K> InteractionEvent<K> {
    /// Button involved in the event
    pub fn button(&self) -> u8 {
        match self {
            InteractionEvent::Pressed { button, .. } | InteractionEvent::Released { button, .. } => *button,
        }
    }

    /// Node under the pointer, if any
    pub fn node(&self) -> Option<&K> {
        match self {
            InteractionEvent::Pressed { node, .. } | InteractionEvent::Released { node, .. } => node.as_ref(),
        }
    }
}

/// Thread-safe FIFO of events, cloneable into producer and consumer handles
#[derive(Debug)]
pub struct EventQueue<E> {
    events: Arc<Mutex<VecDeque<E>>>,
}

impl<E> EventQueue<E> {
    /// Create an empty queue
    pub fn new() -> Self {
        EventQueue {
            events: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Append an event
    pub fn push(&self, event: E) {
        self.events.lock().push_back(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&self) -> Vec<E> {
        self.events.lock().drain(..).collect()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events are pending
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl<E> Clone for EventQueue<E> {
    fn clone(&self) -> Self {
        EventQueue {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_consumes_in_order() {
        let queue = EventQueue::new();
        queue.push(InteractionEvent::Pressed { button: 1, node: Some("a") });
        queue.push(InteractionEvent::Released { button: 1, node: None });
        assert_eq!(queue.len(), 2);

        let events = queue.drain();
        assert_eq!(events[0].node(), Some(&"a"));
        assert_eq!(events[1].button(), 1);
        assert!(matches!(events[1], InteractionEvent::Released { node: None, .. }));
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_producer_and_consumer_handles() {
        let queue: EventQueue<u32> = EventQueue::new();
        let producers: Vec<_> = (0..4)
            .map(|t| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        queue.push(t * 100 + i);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let mut events = queue.drain();
        events.sort_unstable();
        assert_eq!(events, (0..400).collect::<Vec<_>>());
    }
}
