use dashmap::DashMap;

/// Process-wide record of which primary models answered their probe.
///
/// Entries never expire; a model found missing stays missing until
/// `reset` is called.
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    entries: DashMap<String, bool>,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, model: &str) -> Option<bool> {
        self.entries.get(model).map(|e| *e)
    }

    pub fn mark(&self, model: impl Into<String>, available: bool) {
        self.entries.insert(model.into(), available);
    }

    pub fn reset(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
