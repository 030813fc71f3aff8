//! Prospect-list lifecycle
//!
//! ```text
//! Searched → Scored → Ranked → Reviewed ⇄ Refined → Searched ...
//!                                  └→ Approved
//! ```

use chrono::{DateTime, Utc};
use leadgen_core::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    /// Candidates fetched and normalized
    Searched,
    Scored,
    Ranked,
    /// Ranked list shown to the user
    Reviewed,
    /// ICP adjusted from feedback; the next search uses it
    Refined,
    /// Terminal
    Approved,
}

static LIST_TRANSITIONS: Lazy<HashMap<ListState, &'static [ListState]>> = Lazy::new(|| {
    use ListState::*;
    let mut map = HashMap::new();
    map.insert(Searched, &[Scored] as &[_]);
    map.insert(Scored, &[Ranked] as &[_]);
    map.insert(Ranked, &[Reviewed] as &[_]);
    map.insert(Reviewed, &[Refined, Approved] as &[_]);
    map.insert(Refined, &[Searched] as &[_]);
    map.insert(Approved, &[] as &[_]);
    map
});

impl ListState {
    pub fn allowed_transitions(&self) -> &'static [ListState] {
        LIST_TRANSITIONS.get(self).copied().unwrap_or(&[])
    }

    /// Staying in the same state is always allowed
    pub fn can_transition_to(&self, target: ListState) -> bool {
        *self == target || self.allowed_transitions().contains(&target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListState::Searched => "searched",
            ListState::Scored => "scored",
            ListState::Ranked => "ranked",
            ListState::Reviewed => "reviewed",
            ListState::Refined => "refined",
            ListState::Approved => "approved",
        }
    }
}

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: Option<ListState>,
    pub to: ListState,
    pub at: DateTime<Utc>,
}

/// Current state plus transition history. Starts with no state; the only
/// way in is `Searched`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListLifecycle {
    state: Option<ListState>,
    history: Vec<TransitionRecord>,
}

impl ListLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<ListState> {
        self.state
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn can_transition_to(&self, to: ListState) -> bool {
        match self.state {
            Some(from) => from.can_transition_to(to),
            None => to == ListState::Searched,
        }
    }

    /// Fail with `InvalidTransition` unless `to` is reachable from here
    pub fn check(&self, to: ListState) -> Result<()> {
        if self.can_transition_to(to) {
            return Ok(());
        }
        Err(Error::InvalidTransition {
            from: self.state.map(|s| s.as_str()).unwrap_or("none").to_string(),
            to: to.as_str().to_string(),
        })
    }

    pub fn transition(&mut self, to: ListState) -> Result<()> {
        self.check(to)?;

        if self.state != Some(to) {
            tracing::debug!(
                from = self.state.map(|s| s.as_str()).unwrap_or("none"),
                to = to.as_str(),
                "List state transition"
            );
        }
        self.history.push(TransitionRecord {
            from: self.state,
            to,
            at: Utc::now(),
        });
        self.state = Some(to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ListState::*;

    #[test]
    fn test_full_cycle() {
        let mut lifecycle = ListLifecycle::new();
        for state in [Searched, Scored, Ranked, Reviewed, Refined, Searched, Scored, Ranked, Reviewed, Approved] {
            lifecycle.transition(state).unwrap();
        }
        assert_eq!(lifecycle.state(), Some(Approved));
        assert_eq!(lifecycle.history().len(), 10);
        assert_eq!(lifecycle.history()[0].from, None);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut lifecycle = ListLifecycle::new();
        assert!(matches!(
            lifecycle.transition(Ranked),
            Err(Error::InvalidTransition { .. })
        ));

        lifecycle.transition(Searched).unwrap();
        let err = lifecycle.transition(Approved).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidTransition {
                from: "searched".into(),
                to: "approved".into()
            }
        );
        assert_eq!(lifecycle.state(), Some(Searched));
    }

    #[test]
    fn test_approved_is_terminal() {
        assert!(Approved.allowed_transitions().is_empty());
        assert!(!Approved.can_transition_to(Searched));
        assert!(Ranked.can_transition_to(Ranked));
    }
}
