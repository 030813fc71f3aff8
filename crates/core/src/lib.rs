//! Core types and traits for prospect scoring
//!
//! This crate provides the foundational types used by the other crates:
//! - Ideal Customer Profile (ICP) and its criteria
//! - Company, Person, Prospect and ProspectScore value types
//! - Collaborator traits (scoring strategy, prospect registry, search source)
//! - Error types

pub mod error;
pub mod icp;
pub mod prospect;
pub mod traits;

pub use error::{Error, Result};
pub use icp::{CompanySizeCriterion, Criterion, FeedbackEntry, Icp};
pub use prospect::{
    ActivityLevel, Company, Person, Post, Priority, Prospect, ProspectScore, ProspectStatus,
};
pub use traits::{ProspectSource, ProspectStore, RawCandidate, ScoringStrategy};
