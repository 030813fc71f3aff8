//! Prospect registry trait

use std::sync::Arc;

use crate::{Prospect, ProspectScore, Result};

/// Registry of prospects keyed by id.
///
/// Prospects live for the whole session and are only removed by an explicit
/// [`ProspectStore::evict`]. Rescoring replaces the score reference under the
/// store's own synchronization; readers never observe a half-written score.
pub trait ProspectStore: Send + Sync {
    fn get(&self, id: &str) -> Option<Prospect>;

    /// Insert or overwrite a prospect
    fn put(&self, prospect: Prospect);

    /// Prospects for the given ids, in the given order; unknown ids skipped
    fn list_by_ids(&self, ids: &[String]) -> Vec<Prospect>;

    /// Swap in a new score for an existing prospect
    fn replace_score(&self, id: &str, score: Arc<ProspectScore>) -> Result<()>;

    /// Remove a prospect, returning it if it existed
    fn evict(&self, id: &str) -> Option<Prospect>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
