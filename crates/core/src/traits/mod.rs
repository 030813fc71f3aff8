//! Collaborator traits for the scoring core
//!
//! The scoring/ranking core stays a pure function of its inputs; everything
//! it talks to sits behind one of these seams:
//!
//! ```text
//! Scoring:
//!   - ScoringStrategy: (Prospect, ICP) → ProspectScore
//!
//! Registry:
//!   - ProspectStore: id → Prospect, externally synchronized
//!
//! Search:
//!   - ProspectSource: ICP → raw provider candidates
//! ```

mod scoring;
mod source;
mod store;

pub use scoring::ScoringStrategy;
pub use source::{ProspectSource, RawCandidate};
pub use store::ProspectStore;
