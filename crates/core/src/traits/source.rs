//! Search collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Icp, Result};

/// Raw candidate as returned by a search provider.
///
/// Field presence is best effort; normalization into `Company`/`Person`
/// happens once, per source, before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub company: serde_json::Value,
    #[serde(default)]
    pub person: serde_json::Value,
    pub source: String,
}

/// External company/people search provider
#[async_trait]
pub trait ProspectSource: Send + Sync {
    /// Search for candidates matching the ICP
    async fn search(&self, icp: &Icp, limit: usize) -> Result<Vec<RawCandidate>>;

    /// Source tag stamped on every prospect this source produces
    fn name(&self) -> &str;
}
