//! Live-connection tracking and change notifications
//!
//! Connections are tracked for logging only. Every successful mutation
//! produces a [`ChangeEvent`] which the transport layer fans out to all
//! tracked connections.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

use crate::task::Task;
use crate::week::Week;

/// Buffered events per subscriber before slow receivers start lagging
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Week,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// One committed mutation
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub entity: EntityKind,
    pub action: ChangeAction,
    pub record: Value,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn week(action: ChangeAction, week: &Week) -> Self {
        Self::new(EntityKind::Week, action, serde_json::to_value(week))
    }

    pub fn task(action: ChangeAction, task: &Task) -> Self {
        Self::new(EntityKind::Task, action, serde_json::to_value(task))
    }

    fn new(entity: EntityKind, action: ChangeAction, record: serde_json::Result<Value>) -> Self {
        Self {
            entity,
            action,
            record: record.unwrap_or(Value::Null),
            at: Utc::now(),
        }
    }
}

/// Fan-out of change events to any number of subscribers
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

/// Registry of live client connections
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(&self, id: impl Into<String>) {
        let id = id.into();
        info!("Client connected: {}", id);
        self.connections.write().await.insert(id, Utc::now());
    }

    pub async fn disconnect(&self, id: &str) {
        if self.connections.write().await.remove(id).is_some() {
            info!("Client disconnected: {}", id);
        }
    }

    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let registry = ConnectionRegistry::new();
        registry.connect("a").await;
        registry.connect("b").await;
        assert_eq!(registry.count().await, 2);

        registry.disconnect("a").await;
        assert_eq!(registry.count().await, 1);
        registry.disconnect("a").await;
        assert_eq!(registry.count().await, 1);

        // Unknown ids are ignored
        registry.disconnect("zzz").await;
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        let week = Week {
            id: "w1".to_string(),
            year: 2024,
            numweek: 10,
            color: "#fff".to_string(),
            description: String::new(),
            priority: 1,
            link: String::new(),
        };
        notifier.publish(ChangeEvent::week(ChangeAction::Created, &week));

        for rx in [&mut first, &mut second] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.entity, EntityKind::Week);
            assert_eq!(event.action, ChangeAction::Created);
            assert_eq!(event.record["id"], "w1");
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = ChangeNotifier::new();
        let week = Week {
            id: "w1".to_string(),
            year: 2024,
            numweek: 1,
            color: String::new(),
            description: String::new(),
            priority: 0,
            link: String::new(),
        };
        notifier.publish(ChangeEvent::week(ChangeAction::Deleted, &week));
    }
}
