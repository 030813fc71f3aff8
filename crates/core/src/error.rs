//! Error types shared across the lead-generation crates
//!
//! Messy prospect data never produces an error: gaps degrade sub-scores and
//! surface as weakness strings. Errors are reserved for caller bugs
//! (empty input, illegal lifecycle transitions) and collaborator failures.

use thiserror::Error;

/// Core errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Scoring was asked for with a missing or blank prospect/ICP
    #[error("Empty input: {what}")]
    EmptyInput { what: String },

    #[error("Invalid ICP: {0}")]
    InvalidIcp(String),

    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Prospect not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Search source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn empty_input(what: impl Into<String>) -> Self {
        Error::EmptyInput { what: what.into() }
    }

    /// True when the caller could not be served at all (as opposed to a
    /// result that was computed with data gaps).
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::EmptyInput { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
