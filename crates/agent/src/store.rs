//! In-memory prospect registry

use std::collections::HashMap;
use std::sync::Arc;

use leadgen_core::{Error, Prospect, ProspectScore, ProspectStore, Result};
use parking_lot::RwLock;

/// Session-lifetime registry backed by a `HashMap`
#[derive(Default)]
pub struct InMemoryProspectStore {
    prospects: RwLock<HashMap<String, Prospect>>,
}

impl InMemoryProspectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `update` to a stored prospect under the write lock
    pub fn update<F>(&self, id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut Prospect),
    {
        let mut prospects = self.prospects.write();
        let prospect = prospects
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        update(prospect);
        Ok(())
    }
}

impl ProspectStore for InMemoryProspectStore {
    fn get(&self, id: &str) -> Option<Prospect> {
        self.prospects.read().get(id).cloned()
    }

    fn put(&self, prospect: Prospect) {
        self.prospects.write().insert(prospect.id.clone(), prospect);
    }

    fn list_by_ids(&self, ids: &[String]) -> Vec<Prospect> {
        let prospects = self.prospects.read();
        ids.iter().filter_map(|id| prospects.get(id).cloned()).collect()
    }

    fn replace_score(&self, id: &str, score: Arc<ProspectScore>) -> Result<()> {
        self.update(id, |prospect| prospect.score = Some(score))
    }

    fn evict(&self, id: &str) -> Option<Prospect> {
        self.prospects.write().remove(id)
    }

    fn len(&self) -> usize {
        self.prospects.read().len()
    }
}
