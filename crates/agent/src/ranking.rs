//! Ranking and filtering
//!
//! Filter on a minimum score, stable sort descending, truncate. Ties keep
//! their input (discovery) order, which makes ranking idempotent.

use leadgen_config::RankingConfig;
use leadgen_core::Prospect;
use serde::{Deserialize, Serialize};

/// Score a ranking sorts and filters on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Computed total score
    #[default]
    TotalScore,
    /// Total score after the user's manual adjustment
    EffectiveScore,
}

impl SortKey {
    /// Key value for a prospect; unscored prospects rank as 0.0
    pub fn value(&self, prospect: &Prospect) -> f64 {
        match self {
            SortKey::TotalScore => prospect.total_score(),
            SortKey::EffectiveScore => prospect.effective_score(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOptions {
    #[serde(default)]
    pub min_score: f64,
    #[serde(default)]
    pub sort_key: SortKey,
    /// `None` returns every prospect that passes the filter
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            sort_key: SortKey::TotalScore,
            limit: None,
        }
    }
}

impl RankOptions {
    pub fn from_config(config: &RankingConfig) -> Self {
        Self {
            min_score: config.default_min_score,
            sort_key: SortKey::TotalScore,
            limit: config.default_limit,
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Ranked list plus the counts behind it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedProspects {
    pub ranked: Vec<Prospect>,
    pub total_evaluated: usize,
    pub total_after_filter: usize,
}

/// Rank prospects. An empty input is a valid, empty result.
pub fn rank(prospects: Vec<Prospect>, options: &RankOptions) -> RankedProspects {
    let total_evaluated = prospects.len();
    let key = options.sort_key;

    let mut ranked: Vec<Prospect> = prospects
        .into_iter()
        .filter(|p| key.value(p) >= options.min_score)
        .collect();
    let total_after_filter = ranked.len();

    // sort_by is stable
    ranked.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));

    if let Some(limit) = options.limit {
        ranked.truncate(limit);
    }

    metrics::counter!("leadgen_rank_requests_total").increment(1);
    tracing::info!(
        total_evaluated,
        total_after_filter,
        returned = ranked.len(),
        min_score = options.min_score,
        sort_key = ?key,
        "Prospects ranked"
    );

    RankedProspects {
        ranked,
        total_evaluated,
        total_after_filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgen_core::{Company, Person, ProspectScore};
    use std::sync::Arc;

    fn scored(id: &str, total: f64) -> Prospect {
        let mut prospect = Prospect::new(id, Company::named(id), Person::default(), "test");
        prospect.score = Some(Arc::new(ProspectScore {
            total_score: total,
            company_match_score: 0.0,
            person_match_score: 0.0,
            intent_score: 0.0,
            engagement_score: 0.0,
            criteria_scores: Default::default(),
            explanation: String::new(),
            strengths: vec![],
            weaknesses: vec![],
            scoring_method: "test".into(),
            icp_version: 1,
        }));
        prospect
    }

    fn ids(result: &RankedProspects) -> Vec<&str> {
        result.ranked.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_ties_keep_input_order() {
        let prospects = vec![scored("a", 0.5), scored("b", 0.9), scored("c", 0.5), scored("d", 0.9)];
        let result = rank(prospects, &RankOptions::default());
        assert_eq!(ids(&result), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_unscored_rank_as_zero() {
        let unscored = Prospect::new("u", Company::named("u"), Person::default(), "test");
        let result = rank(vec![unscored, scored("s", 0.1)], &RankOptions::default());
        assert_eq!(ids(&result), vec!["s", "u"]);

        let filtered = rank(result.ranked, &RankOptions::default().with_min_score(0.05));
        assert_eq!(ids(&filtered), vec!["s"]);
    }

    #[test]
    fn test_effective_score_key() {
        let mut boosted = scored("a", 0.5);
        boosted.user_score_adjustment = Some(0.4);
        let options = RankOptions {
            sort_key: SortKey::EffectiveScore,
            ..Default::default()
        };
        let result = rank(vec![scored("b", 0.7), boosted], &options);
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn test_limit_zero_returns_nothing() {
        let result = rank(vec![scored("a", 0.5)], &RankOptions::default().with_limit(0));
        assert!(result.ranked.is_empty());
        assert_eq!(result.total_after_filter, 1);
    }

    #[test]
    fn test_from_config() {
        let config = RankingConfig {
            default_min_score: 0.3,
            default_limit: Some(25),
        };
        let options = RankOptions::from_config(&config);
        assert_eq!(options.min_score, 0.3);
        assert_eq!(options.limit, Some(25));
    }
}
