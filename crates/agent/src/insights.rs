//! Summary statistics over a prospect list

use std::collections::{BTreeMap, HashMap};

use leadgen_config::ScoreThresholds;
use leadgen_core::{Priority, Prospect};
use serde::Serialize;

const TOP_N: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProspectInsights {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Mean total score over scored prospects, 0.0 when none are scored
    pub average_score: f64,
    pub top_industries: Vec<(String, usize)>,
    pub top_titles: Vec<(String, usize)>,
    pub source_breakdown: BTreeMap<String, usize>,
}

/// Most frequent values, ties broken by name
fn top_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(TOP_N);
    sorted
}

pub fn summarize(prospects: &[Prospect], thresholds: &ScoreThresholds) -> ProspectInsights {
    let mut insights = ProspectInsights {
        total: prospects.len(),
        ..Default::default()
    };

    let mut score_sum = 0.0;
    let mut scored = 0usize;
    for prospect in prospects {
        match prospect.effective_priority(thresholds.minimum_score, thresholds.high_priority) {
            Priority::High => insights.high += 1,
            Priority::Medium => insights.medium += 1,
            Priority::Low => insights.low += 1,
        }
        if let Some(score) = &prospect.score {
            score_sum += score.total_score;
            scored += 1;
        }
        *insights
            .source_breakdown
            .entry(prospect.source.clone())
            .or_default() += 1;
    }
    if scored > 0 {
        insights.average_score = score_sum / scored as f64;
    }

    insights.top_industries = top_counts(
        prospects
            .iter()
            .filter_map(|p| p.company.industry.as_deref()),
    );
    insights.top_titles = top_counts(prospects.iter().filter_map(|p| p.person.title()));

    insights
}
