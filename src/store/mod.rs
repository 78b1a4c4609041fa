//! Read-only access to the carol songbook and event chat.
//!
//! The tools only ever query these stores. Production deployments back
//! them with the application's relational database; [`MemoryStore`] serves
//! tests and single-process setups.

mod memory;

pub use memory::MemoryStore;

use thiserror::Error;

use crate::types::{Carol, Energy, EventMessage};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("event not found: {event_id}")]
    EventNotFound { event_id: String },

    #[error("query failed: {message}")]
    Query { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Filters accepted by [`CarolStore::get_carols`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarolFilter {
    /// Free text matched against title, artist and tags.
    pub query: Option<String>,
    pub energy: Option<Energy>,
    /// Substring matched against tags.
    pub tag: Option<String>,
}

impl CarolFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.trim().is_empty()).then_some(query);
        self
    }

    pub fn energy(mut self, energy: Energy) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, carol: &Carol) -> bool {
        if let Some(energy) = self.energy
            && carol.energy != energy
        {
            return false;
        }
        if let Some(ref tag) = self.tag
            && !carol.has_tag_containing(tag)
        {
            return false;
        }
        match self.query {
            Some(ref query) => {
                let needle = query.to_lowercase();
                carol.title.to_lowercase().contains(&needle)
                    || carol.artist.to_lowercase().contains(&needle)
                    || carol.has_tag_containing(&needle)
            }
            None => true,
        }
    }
}

/// Songbook queries.
#[async_trait::async_trait]
pub trait CarolStore: Send + Sync {
    fn name(&self) -> &str;

    /// Carols matching `filter`, in stable songbook order.
    async fn get_carols(&self, filter: &CarolFilter) -> StoreResult<Vec<Carol>>;
}

/// Event chat queries.
#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    fn name(&self) -> &str;

    /// All messages for an event, oldest first.
    async fn get_event_messages(&self, event_id: &str) -> StoreResult<Vec<EventMessage>>;
}
