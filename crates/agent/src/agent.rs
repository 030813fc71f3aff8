//! Prospect agent
//!
//! Drives one prospect list through search → score → rank → review →
//! refine. Every search opens a new round; earlier rounds and the scores
//! they produced stay available for comparison. Once feedback names liked
//! or disliked prospects, later rounds carry a similarity adjustment and
//! rank on the effective score by default.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadgen_config::{RankingConfig, ScoreThresholds, Settings};
use leadgen_core::{
    Icp, Prospect, ProspectScore, ProspectSource, ProspectStatus, ProspectStore,
    RawCandidate, ScoringStrategy,
};
use leadgen_scoring::{score_batch, BatchOptions, BatchOutcome, ProspectScorer};
use parking_lot::RwLock;
use serde::Serialize;

use crate::ingest::normalize_candidates;
use crate::insights::{summarize, ProspectInsights};
use crate::lifecycle::{ListLifecycle, ListState};
use crate::ranking::{rank, RankOptions, RankedProspects, SortKey};
use crate::refinement::{
    FeedbackExamples, FeedbackRefiner, RefinementOutcome, EXCLUDED_INDUSTRIES, EXCLUDED_TITLES,
};
use crate::AgentError;

/// One search/score/rank pass over a prospect set
#[derive(Debug, Clone, Serialize)]
pub struct RankedRound {
    /// 1-based round number
    pub round: usize,
    pub icp_version: u32,
    /// Prospects found by the search, in discovery order
    pub prospect_ids: Vec<String>,
    /// Output of the last ranking, best first
    pub ranked_ids: Vec<String>,
    /// Scores computed in this round, kept after later rescoring
    pub scores: HashMap<String, Arc<ProspectScore>>,
    /// Non-zero similarity adjustments to liked/disliked examples
    pub adjustments: HashMap<String, f64>,
    pub total_evaluated: usize,
    pub total_after_filter: usize,
    pub started_at: DateTime<Utc>,
}

/// Result of a refinement request
#[derive(Debug, Clone, Serialize)]
pub struct RefineResponse {
    pub outcome: RefinementOutcome,
    /// Ranked list the feedback was given on
    pub previous: Vec<Prospect>,
    /// True when the feedback mapped to no criteria change
    pub no_changes_applied: bool,
}

#[derive(Default)]
struct AgentState {
    icp: Option<Arc<Icp>>,
    lifecycle: ListLifecycle,
    rounds: Vec<RankedRound>,
    /// Latest liked/disliked prospects, applied from the next scoring on
    examples: FeedbackExamples,
}

impl AgentState {
    fn active_round(&self) -> Result<&RankedRound, AgentError> {
        self.rounds.last().ok_or(AgentError::NoActiveList)
    }

    fn icp(&self) -> Result<Arc<Icp>, AgentError> {
        self.icp.clone().ok_or(AgentError::MissingIcp)
    }
}

/// Prospect pipeline facade
pub struct ProspectAgent {
    store: Arc<dyn ProspectStore>,
    scorer: Arc<dyn ScoringStrategy>,
    source: Option<Arc<dyn ProspectSource>>,
    refiner: FeedbackRefiner,
    ranking: RankingConfig,
    thresholds: ScoreThresholds,
    batch: BatchOptions,
    state: RwLock<AgentState>,
}

impl ProspectAgent {
    /// Agent with the heuristic scorer configured from `settings`
    pub fn new(settings: &Settings, store: Arc<dyn ProspectStore>) -> Result<Self, AgentError> {
        Ok(Self {
            store,
            scorer: Arc::new(ProspectScorer::new(settings.scoring.clone())),
            source: None,
            refiner: FeedbackRefiner::new(settings.refinement.clone())?,
            ranking: settings.ranking.clone(),
            thresholds: settings.scoring.thresholds.clone(),
            batch: BatchOptions {
                max_concurrency: settings.pipeline.max_concurrency,
                chunk_size: settings.pipeline.batch_chunk_size,
            },
            state: RwLock::new(AgentState::default()),
        })
    }

    pub fn with_source(mut self, source: Arc<dyn ProspectSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the scoring strategy
    pub fn with_scorer(mut self, scorer: Arc<dyn ScoringStrategy>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn store(&self) -> &Arc<dyn ProspectStore> {
        &self.store
    }

    /// Validate and install the ICP. Criterion weights summing past 1.0
    /// are rescaled to sum to 1.0.
    pub fn set_icp(&self, icp: Icp) -> Result<(), AgentError> {
        icp.validate()?;
        let total_weight = icp.total_criteria_weight();
        let icp = if total_weight > 1.0 {
            tracing::warn!(icp_id = %icp.id, total_weight, "Criterion weights exceed 1.0, normalizing");
            icp.normalized()
        } else {
            icp
        };
        tracing::info!(icp_id = %icp.id, version = icp.version, "ICP set");
        self.state.write().icp = Some(Arc::new(icp));
        Ok(())
    }

    pub fn icp(&self) -> Option<Arc<Icp>> {
        self.state.read().icp.clone()
    }

    pub fn list_state(&self) -> Option<ListState> {
        self.state.read().lifecycle.state()
    }

    pub fn lifecycle(&self) -> ListLifecycle {
        self.state.read().lifecycle.clone()
    }

    /// Query the configured source and ingest what it returns
    pub async fn search(&self, limit: usize) -> Result<Vec<String>, AgentError> {
        let source = self.source.clone().ok_or(AgentError::NoSource)?;
        let icp = self.state.read().icp()?;

        let candidates = source
            .search(&icp, limit)
            .await
            .map_err(|e| AgentError::Search(e.to_string()))?;
        tracing::info!(source = source.name(), found = candidates.len(), "Search completed");

        self.ingest(&candidates)
    }

    /// Normalize raw candidates, drop excluded ones, register the rest and
    /// open a new round. Returns the new prospect ids in discovery order.
    pub fn ingest(&self, candidates: &[RawCandidate]) -> Result<Vec<String>, AgentError> {
        let mut state = self.state.write();
        let icp = state.icp()?;
        state.lifecycle.check(ListState::Searched)?;

        let prospects = normalize_candidates(candidates);
        let before = prospects.len();
        let mut ids = Vec::with_capacity(before);
        for prospect in prospects.into_iter().filter(|p| !is_excluded(&icp, p)) {
            ids.push(prospect.id.clone());
            self.store.put(prospect);
        }
        if ids.len() < before {
            tracing::info!(excluded = before - ids.len(), "Dropped prospects matching ICP exclusions");
        }

        state.lifecycle.transition(ListState::Searched)?;
        let round = state.rounds.len() + 1;
        state.rounds.push(RankedRound {
            round,
            icp_version: icp.version,
            prospect_ids: ids.clone(),
            ranked_ids: Vec::new(),
            scores: HashMap::new(),
            adjustments: HashMap::new(),
            total_evaluated: 0,
            total_after_filter: 0,
            started_at: Utc::now(),
        });
        tracing::info!(round, prospects = ids.len(), "Prospect list opened");

        Ok(ids)
    }

    /// Score the active round against the current ICP
    pub async fn score_active(&self) -> Result<BatchOutcome, AgentError> {
        let (round, icp, ids, examples) = {
            let state = self.state.read();
            state.lifecycle.check(ListState::Scored)?;
            let active = state.active_round()?;
            (
                active.round,
                state.icp()?,
                active.prospect_ids.clone(),
                state.examples.clone(),
            )
        };

        let prospects = self.store.list_by_ids(&ids);
        let mut outcome = score_batch(Arc::clone(&self.scorer), prospects, icp, self.batch).await?;

        let mut adjustments = HashMap::new();
        if !examples.is_empty() {
            for prospect in &mut outcome.scored {
                let adjustment = examples.adjustment(prospect);
                if adjustment != 0.0 {
                    prospect.user_score_adjustment = Some(adjustment);
                    adjustments.insert(prospect.id.clone(), adjustment);
                }
            }
            tracing::info!(round, adjusted = adjustments.len(), "Applied feedback similarity adjustments");
        }

        for prospect in &outcome.scored {
            if adjustments.contains_key(&prospect.id) {
                self.store.put(prospect.clone());
            } else if let Some(score) = &prospect.score {
                if let Err(e) = self.store.replace_score(&prospect.id, Arc::clone(score)) {
                    tracing::warn!(prospect_id = %prospect.id, error = %e, "Score not stored");
                }
            }
        }

        let mut state = self.state.write();
        if let Some(active) = state.rounds.iter_mut().find(|r| r.round == round) {
            for prospect in &outcome.scored {
                if let Some(score) = &prospect.score {
                    active.scores.insert(prospect.id.clone(), Arc::clone(score));
                }
            }
            active.adjustments.extend(adjustments);
        }
        state.lifecycle.transition(ListState::Scored)?;

        Ok(outcome)
    }

    /// Rank the active round. `None` uses the configured defaults, sorting
    /// on the effective score when the round carries feedback adjustments.
    pub fn rank_active(&self, options: Option<RankOptions>) -> Result<RankedProspects, AgentError> {
        let mut state = self.state.write();
        state.lifecycle.check(ListState::Ranked)?;

        let active = state.active_round()?;
        let ids = active.prospect_ids.clone();
        let options = options.unwrap_or_else(|| {
            let mut options = RankOptions::from_config(&self.ranking);
            if !active.adjustments.is_empty() {
                options.sort_key = SortKey::EffectiveScore;
            }
            options
        });
        let result = rank(self.store.list_by_ids(&ids), &options);

        if let Some(active) = state.rounds.last_mut() {
            active.ranked_ids = result.ranked.iter().map(|p| p.id.clone()).collect();
            active.total_evaluated = result.total_evaluated;
            active.total_after_filter = result.total_after_filter;
        }
        state.lifecycle.transition(ListState::Ranked)?;

        Ok(result)
    }

    /// Record that the ranked list was shown to the user
    pub fn mark_reviewed(&self) -> Result<Vec<Prospect>, AgentError> {
        let mut state = self.state.write();
        state.lifecycle.transition(ListState::Reviewed)?;
        let ids = state.active_round()?.ranked_ids.clone();
        Ok(self.set_status(&ids, ProspectStatus::Reviewed))
    }

    /// Apply review feedback to the ICP.
    ///
    /// When the feedback maps to no change the current ranked list stays
    /// active and the list remains in review.
    pub fn refine(
        &self,
        feedback: &str,
        liked_ids: &[String],
        disliked_ids: &[String],
    ) -> Result<RefineResponse, AgentError> {
        let mut state = self.state.write();
        state.lifecycle.check(ListState::Refined)?;
        let icp = state.icp()?;
        let previous = self.store.list_by_ids(&state.active_round()?.ranked_ids);

        let outcome = self
            .refiner
            .refine(&icp, feedback, liked_ids, disliked_ids, self.store.as_ref());
        self.tag(liked_ids, "liked", feedback);
        self.tag(disliked_ids, "disliked", feedback);
        if !outcome.examples.is_empty() {
            state.examples = outcome.examples.clone();
        }

        if outcome.changed {
            state.icp = Some(Arc::new(outcome.updated_icp.clone()));
            state.lifecycle.transition(ListState::Refined)?;
        }

        Ok(RefineResponse {
            no_changes_applied: !outcome.changed,
            outcome,
            previous,
        })
    }

    /// Refine using 1-based positions in the active ranked list.
    /// Positions outside the list are ignored.
    pub fn refine_by_indices(
        &self,
        feedback: &str,
        liked: &[usize],
        disliked: &[usize],
    ) -> Result<RefineResponse, AgentError> {
        let (liked_ids, disliked_ids) = {
            let state = self.state.read();
            let ranked = &state.active_round()?.ranked_ids;
            let resolve = |positions: &[usize]| -> Vec<String> {
                positions
                    .iter()
                    .filter_map(|&n| match n {
                        n if n >= 1 && n <= ranked.len() => Some(ranked[n - 1].clone()),
                        n => {
                            tracing::debug!(position = n, listed = ranked.len(), "Ignoring out-of-range prospect number");
                            None
                        }
                    })
                    .collect()
            };
            (resolve(liked), resolve(disliked))
        };
        self.refine(feedback, &liked_ids, &disliked_ids)
    }

    /// Approve the reviewed list; terminal for this list
    pub fn approve(&self) -> Result<Vec<Prospect>, AgentError> {
        let mut state = self.state.write();
        state.lifecycle.transition(ListState::Approved)?;
        let ids = state.active_round()?.ranked_ids.clone();
        tracing::info!(round = state.rounds.len(), approved = ids.len(), "Prospect list approved");
        Ok(self.set_status(&ids, ProspectStatus::Approved))
    }

    /// search → score → rank with the current ICP
    pub async fn run_cycle(
        &self,
        limit: usize,
        options: Option<RankOptions>,
    ) -> Result<RankedProspects, AgentError> {
        self.search(limit).await?;
        self.score_active().await?;
        self.rank_active(options)
    }

    pub fn rounds(&self) -> Vec<RankedRound> {
        self.state.read().rounds.clone()
    }

    pub fn active_round(&self) -> Option<RankedRound> {
        self.state.read().rounds.last().cloned()
    }

    /// Insights over the active round's prospects
    pub fn insights(&self) -> ProspectInsights {
        let ids = self
            .active_round()
            .map(|round| round.prospect_ids)
            .unwrap_or_default();
        summarize(&self.store.list_by_ids(&ids), &self.thresholds)
    }

    fn set_status(&self, ids: &[String], status: ProspectStatus) -> Vec<Prospect> {
        self.store
            .list_by_ids(ids)
            .into_iter()
            .map(|mut prospect| {
                prospect.status = status;
                self.store.put(prospect.clone());
                prospect
            })
            .collect()
    }

    fn tag(&self, ids: &[String], tag: &str, feedback: &str) {
        for mut prospect in self.store.list_by_ids(ids) {
            prospect.add_tag(tag);
            if !feedback.trim().is_empty() {
                prospect.user_feedback = Some(feedback.to_string());
                prospect.add_note(&format!("{}: {}", tag, feedback));
            }
            self.store.put(prospect);
        }
    }
}

fn is_excluded(icp: &Icp, prospect: &Prospect) -> bool {
    let industry_excluded = prospect.company.industry.as_deref().is_some_and(|industry| {
        icp.excluded(EXCLUDED_INDUSTRIES)
            .iter()
            .any(|e| e.eq_ignore_ascii_case(industry))
    });
    let title_excluded = prospect.person.title().is_some_and(|title| {
        let title = title.to_lowercase();
        icp.excluded(EXCLUDED_TITLES)
            .iter()
            .any(|e| title.contains(&e.to_lowercase()))
    });
    industry_excluded || title_excluded
}
