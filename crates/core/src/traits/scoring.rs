//! Scoring strategy trait

use crate::{Icp, Prospect, ProspectScore, Result};

/// Computes a [`ProspectScore`] for a prospect against an ICP.
///
/// Implementations must be deterministic for identical inputs and must not
/// mutate shared state, so a batch can be scored on several threads.
/// The built-in implementation is the weighted heuristic scorer; an
/// LLM-assisted scorer would be a separate implementation of this trait.
///
/// # Errors
///
/// Returns [`crate::Error::EmptyInput`] only when the prospect or ICP is
/// blank. Missing attributes degrade sub-scores instead of failing.
pub trait ScoringStrategy: Send + Sync {
    fn score(&self, prospect: &Prospect, icp: &Icp) -> Result<ProspectScore>;

    /// Name recorded in `ProspectScore::scoring_method`
    fn name(&self) -> &str;
}
