//! In-memory carol and message store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{CarolFilter, CarolStore, MessageStore, StoreResult};
use crate::types::{Carol, EventMessage};

/// In-memory store (for testing and single-instance deployments)
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    carols: Arc<RwLock<Vec<Carol>>>,
    messages: Arc<RwLock<HashMap<String, Vec<EventMessage>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_carols(carols: Vec<Carol>) -> Self {
        Self {
            carols: Arc::new(RwLock::new(carols)),
            messages: Arc::default(),
        }
    }

    pub async fn add_carol(&self, carol: Carol) {
        self.carols.write().await.push(carol);
    }

    pub async fn add_message(&self, message: EventMessage) {
        let mut messages = self.messages.write().await;
        let thread = messages.entry(message.event_id.clone()).or_default();
        thread.push(message);
        thread.sort_by_key(|m| m.timestamp);
    }

    pub async fn carol_count(&self) -> usize {
        self.carols.read().await.len()
    }
}

#[async_trait::async_trait]
impl CarolStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_carols(&self, filter: &CarolFilter) -> StoreResult<Vec<Carol>> {
        let carols = self.carols.read().await;
        Ok(carols.iter().filter(|c| filter.matches(c)).cloned().collect())
    }
}

#[async_trait::async_trait]
impl MessageStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_event_messages(&self, event_id: &str) -> StoreResult<Vec<EventMessage>> {
        let messages = self.messages.read().await;
        Ok(messages.get(event_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::types::Energy;

    #[tokio::test]
    async fn test_carols_keep_insertion_order() {
        let store = MemoryStore::new();
        store
            .add_carol(Carol::new("a", "Deck the Halls", "Trad", Energy::High, "2:00"))
            .await;
        store
            .add_carol(Carol::new("b", "Silent Night", "Gruber", Energy::Low, "3:00"))
            .await;

        let all = store.get_carols(&CarolFilter::new()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(store.carol_count().await, 2);
    }

    #[tokio::test]
    async fn test_messages_sorted_by_timestamp() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .add_message(EventMessage::new("e1", "m1", "second").at(now))
            .await;
        store
            .add_message(EventMessage::new("e1", "m2", "first").at(now - Duration::minutes(5)))
            .await;
        store
            .add_message(EventMessage::new("e2", "m3", "elsewhere"))
            .await;

        let thread = store.get_event_messages("e1").await.unwrap();
        let texts: Vec<_> = thread.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert!(store.get_event_messages("missing").await.unwrap().is_empty());
    }
}
