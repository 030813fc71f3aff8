//! Ideal Customer Profile
//!
//! The ICP is the scoring reference. It is treated as an immutable snapshot
//! during a scoring pass; refinement produces a new, higher-versioned ICP and
//! appends to the feedback log instead of editing in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Error, Result};

/// One named, weighted attribute of an ICP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(default)]
    pub description: String,
    /// Relative weight in [0, 1]
    #[serde(default = "default_criterion_weight")]
    pub weight: f64,
    /// Unmet required criteria hard-fail their own criterion score
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub values: Vec<String>,
}

fn default_criterion_weight() -> f64 {
    1.0
}

impl Criterion {
    pub fn new(weight: f64, required: bool, values: Vec<String>) -> Self {
        Self {
            description: String::new(),
            weight: weight.clamp(0.0, 1.0),
            required,
            values,
        }
    }
}

impl Default for Criterion {
    fn default() -> Self {
        Self::new(default_criterion_weight(), false, Vec::new())
    }
}

/// Company-size target, numeric bounds and/or range descriptors ("51-200")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySizeCriterion {
    #[serde(default)]
    pub min_employees: Option<u32>,
    #[serde(default)]
    pub max_employees: Option<u32>,
    #[serde(default)]
    pub ideal_employees: Option<u32>,
    #[serde(default)]
    pub ranges: Vec<String>,
}

impl CompanySizeCriterion {
    pub fn between(min: u32, max: u32) -> Self {
        Self {
            min_employees: Some(min),
            max_employees: Some(max),
            ..Default::default()
        }
    }

    /// True when the criterion carries no usable bound
    pub fn is_empty(&self) -> bool {
        self.min_employees.is_none()
            && self.max_employees.is_none()
            && self.ideal_employees.is_none()
            && self.ranges.iter().all(|r| r.trim().is_empty())
    }
}

/// Entry in the refinement log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: DateTime<Utc>,
    pub feedback: String,
    pub changes: Vec<String>,
    /// Version the feedback was applied to
    pub version: u32,
}

/// Ideal Customer Profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icp {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub company_criteria: BTreeMap<String, Criterion>,
    #[serde(default)]
    pub person_criteria: BTreeMap<String, Criterion>,

    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub company_size: Option<CompanySizeCriterion>,
    #[serde(default)]
    pub geographic_regions: Vec<String>,

    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub seniority_levels: Vec<String>,
    #[serde(default)]
    pub departments: Vec<String>,

    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,

    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub buying_signals: Vec<String>,

    /// Exclusion lists keyed by attribute ("industries", "titles")
    #[serde(default)]
    pub exclusions: BTreeMap<String, Vec<String>>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "initial_version")]
    pub version: u32,
    #[serde(default)]
    pub feedback_history: Vec<FeedbackEntry>,
}

fn initial_version() -> u32 {
    1
}

impl Icp {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            company_criteria: BTreeMap::new(),
            person_criteria: BTreeMap::new(),
            industries: Vec::new(),
            company_size: None,
            geographic_regions: Vec::new(),
            target_roles: Vec::new(),
            seniority_levels: Vec::new(),
            departments: Vec::new(),
            tech_stack: Vec::new(),
            tools_used: Vec::new(),
            pain_points: Vec::new(),
            goals: Vec::new(),
            buying_signals: Vec::new(),
            exclusions: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            version: initial_version(),
            feedback_history: Vec::new(),
        }
    }

    /// Company and person criteria merged; person criteria win on name clash
    pub fn all_criteria(&self) -> BTreeMap<String, Criterion> {
        let mut merged = self.company_criteria.clone();
        merged.extend(
            self.person_criteria
                .iter()
                .map(|(name, criterion)| (name.clone(), criterion.clone())),
        );
        merged
    }

    /// Reject a blank id or a criterion weight outside [0, 1]
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::empty_input("ICP id"));
        }
        for (name, criterion) in self.company_criteria.iter().chain(&self.person_criteria) {
            if !(0.0..=1.0).contains(&criterion.weight) {
                return Err(Error::InvalidIcp(format!(
                    "criterion '{}' weight {} is outside [0, 1]",
                    name, criterion.weight
                )));
            }
        }
        Ok(())
    }

    pub fn total_criteria_weight(&self) -> f64 {
        self.company_criteria
            .values()
            .chain(self.person_criteria.values())
            .map(|c| c.weight)
            .sum()
    }

    /// Copy with every criterion weight rescaled so the total is 1.0
    pub fn normalized(&self) -> Self {
        let total = self.total_criteria_weight();
        let mut icp = self.clone();
        if total > 0.0 {
            for criterion in icp
                .company_criteria
                .values_mut()
                .chain(icp.person_criteria.values_mut())
            {
                criterion.weight /= total;
            }
        }
        icp
    }

    /// Values excluded for the given attribute key
    pub fn excluded(&self, key: &str) -> &[String] {
        self.exclusions.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Next version of this ICP with the feedback recorded in the log.
    ///
    /// `self` is left untouched so prior versions stay comparable.
    pub fn with_feedback(&self, feedback: impl Into<String>, changes: Vec<String>) -> Self {
        let mut next = self.clone();
        next.feedback_history.push(FeedbackEntry {
            timestamp: Utc::now(),
            feedback: feedback.into(),
            changes,
            version: self.version,
        });
        next.version = self.version + 1;
        next.updated_at = Utc::now();
        next
    }
}
