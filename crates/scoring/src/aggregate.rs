//! Score aggregation and explanation
//!
//! The explanation builder is a pure string function over already computed
//! component scores. Nothing it produces feeds back into scoring.

use leadgen_config::ScoringConfig;
use leadgen_core::{Icp, Prospect};

const STRENGTH_THRESHOLD: f64 = 0.7;
const WEAKNESS_THRESHOLD: f64 = 0.4;
const EXCELLENT_MEAN: f64 = 0.8;
const GOOD_MEAN: f64 = 0.6;

/// The four component scores of one prospect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub company_match: f64,
    pub person_match: f64,
    pub intent: f64,
    pub engagement: f64,
}

impl ComponentScores {
    /// Component names as used in the weight table
    pub const NAMES: [&'static str; 4] = ["company_match", "person_match", "intent", "engagement"];

    /// Scores keyed by component name
    pub fn named(&self) -> [(&'static str, f64); 4] {
        let [company, person, intent, engagement] = Self::NAMES;
        [
            (company, self.company_match),
            (person, self.person_match),
            (intent, self.intent),
            (engagement, self.engagement),
        ]
    }

    pub fn mean(&self) -> f64 {
        (self.company_match + self.person_match + self.intent + self.engagement) / 4.0
    }
}

/// Weighted mean of the components, each weight looked up by component name
pub fn aggregate(scores: &ComponentScores, config: &ScoringConfig) -> f64 {
    let mut total_weight = 0.0;
    let mut weighted = 0.0;
    for (name, score) in scores.named() {
        let weight = config.component_weight(name);
        total_weight += weight;
        weighted += score * weight;
    }

    if total_weight <= 0.0 {
        return scores.mean().clamp(0.0, 1.0);
    }
    (weighted / total_weight).clamp(0.0, 1.0)
}

/// Human-readable summary of a score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Explanation {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

fn strength(component: &str, prospect: &Prospect) -> String {
    match component {
        "company_match" => format!(
            "Strong company match - {} aligns well with target profile",
            prospect.company.name
        ),
        "person_match" => match prospect.person.title() {
            Some(title) => format!("Good person match - {} role fits target criteria", title),
            None => "Good person match - seniority and background fit target criteria".to_string(),
        },
        "intent" => "High buying intent signals detected".to_string(),
        _ => "Active social media engagement indicates accessibility".to_string(),
    }
}

fn weakness(component: &str) -> &'static str {
    match component {
        "company_match" => "Company profile may not fully align with ICP requirements",
        "person_match" => "Person's role or seniority may not match target criteria",
        "intent" => "Limited buying intent signals observed",
        _ => "Low recent activity may indicate limited accessibility",
    }
}

/// Missing fields worth flagging. A missing title is always reported;
/// industry only when the ICP targets industries.
pub fn data_gaps(prospect: &Prospect, icp: &Icp) -> Vec<String> {
    let mut gaps = Vec::new();

    if prospect.person.title().is_none() {
        gaps.push("Missing job title".to_string());
    }

    let has_industry = prospect
        .company
        .industry
        .as_deref()
        .map_or(false, |i| !i.trim().is_empty());
    if !icp.industries.is_empty() && !has_industry {
        gaps.push("Missing company industry".to_string());
    }

    gaps
}

/// Build the explanation, strengths and weaknesses for a scored prospect
pub fn explain(prospect: &Prospect, icp: &Icp, scores: &ComponentScores) -> Explanation {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    for (name, score) in scores.named() {
        if score >= STRENGTH_THRESHOLD {
            strengths.push(strength(name, prospect));
        } else if score <= WEAKNESS_THRESHOLD {
            weaknesses.push(weakness(name).to_string());
        }
    }
    weaknesses.extend(data_gaps(prospect, icp));

    let company = &prospect.company.name;
    let mean = scores.mean();
    let summary = if mean >= EXCELLENT_MEAN {
        format!(
            "Excellent match for {}. Strong alignment with ICP across multiple dimensions.",
            company
        )
    } else if mean >= GOOD_MEAN {
        format!(
            "Good potential match for {}. Some areas of strong alignment.",
            company
        )
    } else {
        format!(
            "Limited match for {}. May require further qualification.",
            company
        )
    };

    Explanation {
        summary,
        strengths,
        weaknesses,
    }
}
