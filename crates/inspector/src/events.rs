//! Event Bus - Simple event system for inspector state changes
//!
//! Design: Type-safe events over a broadcast channel.
//! No dynamic dispatch overhead - use enums, not trait objects.

use dom::{ComputedStyles, Mutation};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Inspector events that can be dispatched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InspectorEvent {
    FetchStarted {
        url: String,
        generation: u64,
    },
    DocumentPublished {
        url: String,
        generation: u64,
        node_count: usize,
    },
    /// A result arrived after a newer document was already published
    FetchDiscarded {
        url: String,
        generation: u64,
    },
    FetchFailed {
        url: String,
        generation: u64,
        message: String,
    },
    HoverChanged {
        id: Option<String>,
        mutations: Vec<Mutation>,
    },
    SelectionChanged {
        id: Option<String>,
        mutations: Vec<Mutation>,
    },
    StylesCaptured {
        id: String,
        styles: ComputedStyles,
    },
}

/// Simple event bus using tokio broadcast channel
pub struct EventBus {
    tx: broadcast::Sender<InspectorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: InspectorEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<InspectorEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(InspectorEvent::FetchStarted {
            url: "https://example.com".to_string(),
            generation: 1,
        });

        match rx.recv().await {
            Ok(InspectorEvent::FetchStarted { generation: 1, .. }) => {}
            other => panic!("Expected FetchStarted event, got {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::with_capacity(0);
        bus.publish(InspectorEvent::HoverChanged {
            id: None,
            mutations: Vec::new(),
        });
    }
}
