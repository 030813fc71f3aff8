//! Heuristic prospect scorer

use chrono::{DateTime, Utc};
use leadgen_config::ScoringConfig;
use leadgen_core::{Error, Icp, Prospect, ProspectScore, Result, ScoringStrategy};

use crate::aggregate::{self, ComponentScores};
use crate::{components, criteria};

/// Name recorded in `ProspectScore::scoring_method`
pub const HEURISTIC_METHOD: &str = "heuristic";

/// Weighted heuristic scorer.
///
/// Scores are a pure function of (prospect, ICP, config, reference time).
/// Without a pinned reference time, engagement recency is measured against
/// the wall clock at scoring time.
#[derive(Debug, Clone, Default)]
pub struct ProspectScorer {
    config: ScoringConfig,
    reference_time: Option<DateTime<Utc>>,
}

impl ProspectScorer {
    pub fn new(config: ScoringConfig) -> Self {
        for name in ComponentScores::NAMES {
            if !config.weights.contains_key(name) {
                tracing::debug!(
                    component = name,
                    fallback = config.defaults.missing_component_weight,
                    "No weight configured for component, using fallback"
                );
            }
        }
        Self {
            config,
            reference_time: None,
        }
    }

    /// Pin the instant used for engagement recency
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Score the four components without building the explanation
    pub fn component_scores(&self, prospect: &Prospect, icp: &Icp) -> ComponentScores {
        ComponentScores {
            company_match: components::score_company_match(&prospect.company, icp, &self.config),
            person_match: components::score_person_match(&prospect.person, icp, &self.config),
            intent: components::score_buying_intent(prospect, icp, &self.config),
            engagement: components::score_engagement(&prospect.person, self.now()),
        }
    }

    /// Score one prospect against an ICP.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] when the prospect or ICP id is blank. Data gaps
    /// in the prospect record never fail; they lower sub-scores and are
    /// listed as weaknesses.
    pub fn score_prospect(&self, prospect: &Prospect, icp: &Icp) -> Result<ProspectScore> {
        if prospect.id.trim().is_empty() {
            return Err(Error::empty_input("prospect id"));
        }
        if icp.id.trim().is_empty() {
            return Err(Error::empty_input("icp id"));
        }

        let scores = self.component_scores(prospect, icp);
        let total_score = aggregate::aggregate(&scores, &self.config);
        let criteria_scores = criteria::score_criteria(prospect, icp, &self.config);
        let explanation = aggregate::explain(prospect, icp, &scores);

        let score = ProspectScore {
            total_score,
            company_match_score: scores.company_match,
            person_match_score: scores.person_match,
            intent_score: scores.intent,
            engagement_score: scores.engagement,
            criteria_scores,
            explanation: explanation.summary,
            strengths: explanation.strengths,
            weaknesses: explanation.weaknesses,
            scoring_method: HEURISTIC_METHOD.to_string(),
            icp_version: icp.version,
        };

        let thresholds = &self.config.thresholds;
        tracing::debug!(
            prospect_id = %prospect.id,
            company = %prospect.company.name,
            total = score.total_score,
            priority = score
                .priority_level(thresholds.minimum_score, thresholds.high_priority)
                .as_str(),
            "Prospect scored"
        );
        metrics::counter!("leadgen_prospects_scored_total").increment(1);
        metrics::histogram!("leadgen_prospect_score").record(score.total_score);

        Ok(score)
    }
}

impl ScoringStrategy for ProspectScorer {
    fn score(&self, prospect: &Prospect, icp: &Icp) -> Result<ProspectScore> {
        self.score_prospect(prospect, icp)
    }

    fn name(&self) -> &str {
        HEURISTIC_METHOD
    }
}
