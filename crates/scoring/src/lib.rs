//! Prospect scoring engine
//!
//! Deterministic, multi-factor scoring of prospects against an Ideal
//! Customer Profile:
//! - Criteria matchers: one prospect attribute against one ICP criterion
//! - Component scorers: company match, person match, buying intent, engagement
//! - Aggregation into a total score with explanation, strengths and weaknesses
//! - Per-criterion scores for transparency
//! - Concurrent batch scoring on the blocking pool

pub mod aggregate;
pub mod batch;
pub mod components;
pub mod criteria;
pub mod matchers;
pub mod scorer;

pub use aggregate::{aggregate, explain, ComponentScores, Explanation};
pub use batch::{score_batch, BatchOptions, BatchOutcome};
pub use criteria::{score_criteria, CriterionAttribute};
pub use scorer::{ProspectScorer, HEURISTIC_METHOD};

use thiserror::Error;

/// Scoring errors
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Scoring task failed: {0}")]
    Join(String),

    #[error("Scoring pool closed")]
    PoolClosed,
}
