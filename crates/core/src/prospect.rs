//! Prospect, company and person types
//!
//! These are the canonical shapes the scoring engine sees. Provider-specific
//! records are normalized into them once at ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Company information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employee_count: Option<u32>,
    /// Range descriptor such as "51-200" or "10000+"
    #[serde(default)]
    pub employee_range: Option<String>,
    #[serde(default)]
    pub revenue: Option<String>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub funding_stage: Option<String>,
}

impl Company {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Social activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl ActivityLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(ActivityLevel::Low),
            "medium" | "moderate" => Some(ActivityLevel::Medium),
            "high" => Some(ActivityLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
        }
    }
}

/// A recent social post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: None,
        }
    }
}

/// Person/contact information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Job title; required by the profile but may be missing from providers
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub seniority_level: Option<String>,
    #[serde(default)]
    pub years_experience: Option<u32>,
    #[serde(default)]
    pub years_at_company: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub recent_posts: Vec<Post>,
    #[serde(default)]
    pub last_post_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
}

impl Person {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Title, if present and non-blank
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Priority band derived from a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn from_score(score: f64, minimum_score: f64, high_priority: f64) -> Self {
        if score >= high_priority {
            Priority::High
        } else if score >= minimum_score {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Result of scoring one prospect against one ICP.
///
/// Never mutated after construction; rescoring builds a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProspectScore {
    pub total_score: f64,
    pub company_match_score: f64,
    pub person_match_score: f64,
    pub intent_score: f64,
    pub engagement_score: f64,
    /// Per-criterion scores, informational only
    #[serde(default)]
    pub criteria_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub scoring_method: String,
    #[serde(default)]
    pub icp_version: u32,
}

impl ProspectScore {
    pub fn priority_level(&self, minimum_score: f64, high_priority: f64) -> Priority {
        Priority::from_score(self.total_score, minimum_score, high_priority)
    }
}

/// Prospect review status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectStatus {
    #[default]
    New,
    Reviewed,
    Approved,
    Rejected,
    Contacted,
}

/// A candidate lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: String,
    pub company: Company,
    pub person: Person,
    /// Latest score; swapped wholesale on rescoring
    #[serde(default)]
    pub score: Option<Arc<ProspectScore>>,
    pub source: String,
    pub discovered_at: DateTime<Utc>,

    #[serde(default)]
    pub user_feedback: Option<String>,
    #[serde(default)]
    pub user_score_adjustment: Option<f64>,
    #[serde(default)]
    pub user_priority: Option<Priority>,

    #[serde(default)]
    pub status: ProspectStatus,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Prospect {
    pub fn new(
        id: impl Into<String>,
        company: Company,
        person: Person,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            company,
            person,
            score: None,
            source: source.into(),
            discovered_at: Utc::now(),
            user_feedback: None,
            user_score_adjustment: None,
            user_priority: None,
            status: ProspectStatus::New,
            notes: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Generate a prospect id of the form `prospect_<unix>_<8 hex>`
    pub fn generate_id() -> String {
        let simple = uuid::Uuid::new_v4().simple().to_string();
        format!("prospect_{}_{}", Utc::now().timestamp(), &simple[..8])
    }

    /// Total score, 0.0 when not scored yet
    pub fn total_score(&self) -> f64 {
        self.score.as_ref().map(|s| s.total_score).unwrap_or(0.0)
    }

    /// Same prospect carrying a new score
    pub fn with_score(mut self, score: Arc<ProspectScore>) -> Self {
        self.score = Some(score);
        self
    }

    /// Score after the user's manual adjustment, clamped to [0, 1]
    pub fn effective_score(&self) -> f64 {
        match self.user_score_adjustment {
            Some(adjustment) => (self.total_score() + adjustment).clamp(0.0, 1.0),
            None => self.total_score(),
        }
    }

    /// User override, else the band of the computed score
    pub fn effective_priority(&self, minimum_score: f64, high_priority: f64) -> Priority {
        self.user_priority.unwrap_or_else(|| {
            Priority::from_score(self.total_score(), minimum_score, high_priority)
        })
    }

    pub fn add_note(&mut self, note: &str) {
        self.notes
            .push(format!("{}: {}", Utc::now().to_rfc3339(), note));
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(total: f64) -> Prospect {
        let mut prospect = Prospect::new("p1", Company::named("Acme"), Person::default(), "test");
        prospect.score = Some(Arc::new(ProspectScore {
            total_score: total,
            company_match_score: total,
            person_match_score: total,
            intent_score: total,
            engagement_score: total,
            criteria_scores: BTreeMap::new(),
            explanation: String::new(),
            strengths: vec![],
            weaknesses: vec![],
            scoring_method: "test".into(),
            icp_version: 1,
        }));
        prospect
    }

    #[test]
    fn test_priority_bands() {
        assert_eq!(Priority::from_score(0.85, 0.6, 0.8), Priority::High);
        assert_eq!(Priority::from_score(0.8, 0.6, 0.8), Priority::High);
        assert_eq!(Priority::from_score(0.6, 0.6, 0.8), Priority::Medium);
        assert_eq!(Priority::from_score(0.59, 0.6, 0.8), Priority::Low);
    }

    #[test]
    fn test_effective_score_clamped() {
        let mut prospect = scored(0.9);
        prospect.user_score_adjustment = Some(0.3);
        assert_eq!(prospect.effective_score(), 1.0);

        prospect.user_score_adjustment = Some(-1.5);
        assert_eq!(prospect.effective_score(), 0.0);
    }

    #[test]
    fn test_effective_priority_override() {
        let mut prospect = scored(0.2);
        assert_eq!(prospect.effective_priority(0.6, 0.8), Priority::Low);
        prospect.user_priority = Some(Priority::High);
        assert_eq!(prospect.effective_priority(0.6, 0.8), Priority::High);
    }

    #[test]
    fn test_unscored_total_is_zero() {
        let prospect = Prospect::new("p2", Company::named("Acme"), Person::default(), "test");
        assert_eq!(prospect.total_score(), 0.0);
    }

    #[test]
    fn test_tags_deduplicated_and_notes_timestamped() {
        let mut prospect = scored(0.5);
        prospect.add_tag("warm");
        prospect.add_tag("warm");
        assert_eq!(prospect.tags, vec!["warm".to_string()]);

        prospect.add_note("called");
        assert!(prospect.notes[0].ends_with(": called"));
    }

    #[test]
    fn test_generated_id_shape() {
        let id = Prospect::generate_id();
        assert!(id.starts_with("prospect_"));
        assert_eq!(id.rsplit('_').next().map(str::len), Some(8));
    }

    #[test]
    fn test_blank_title_is_missing() {
        let person = Person::with_title("   ");
        assert!(person.title().is_none());
        assert_eq!(Person::with_title(" CTO ").title(), Some("CTO"));
    }

    #[test]
    fn test_activity_level_parse() {
        assert_eq!(ActivityLevel::parse("HIGH"), Some(ActivityLevel::High));
        assert_eq!(ActivityLevel::parse("moderate"), Some(ActivityLevel::Medium));
        assert_eq!(ActivityLevel::parse("sometimes"), None);
    }
}
