//! Prospect pipeline
//!
//! Wraps the scoring engine with everything around it:
//! - Ingestion adapters normalizing provider records into prospects
//! - An in-memory prospect registry
//! - Ranking and filtering
//! - Feedback refinement of the ICP and the list lifecycle
//! - `ProspectAgent`, the search → score → rank → review → refine facade

pub mod agent;
pub mod ingest;
pub mod insights;
pub mod lifecycle;
pub mod ranking;
pub mod refinement;
pub mod store;

pub use agent::{ProspectAgent, RankedRound, RefineResponse};
pub use ingest::{
    adapter_for, employee_range_for, normalize_candidates, pair_companies_and_people,
    PeopleSearchAdapter, SourceAdapter, WebSearchAdapter,
};
pub use insights::{summarize, ProspectInsights};
pub use lifecycle::{ListLifecycle, ListState, TransitionRecord};
pub use ranking::{rank, RankOptions, RankedProspects, SortKey};
pub use refinement::{
    FeedbackExamples, FeedbackRefiner, RefinementOutcome, EXCLUDED_INDUSTRIES, EXCLUDED_TITLES,
};
pub use store::InMemoryProspectStore;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Core error: {0}")]
    Core(#[from] leadgen_core::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] leadgen_config::ConfigError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] leadgen_scoring::ScoringError),

    #[error("Invalid feedback pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("No ICP set")]
    MissingIcp,

    #[error("No search source configured")]
    NoSource,

    #[error("No active prospect list")]
    NoActiveList,
}
