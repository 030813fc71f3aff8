//! Feedback refinement
//!
//! Maps review feedback onto concrete ICP changes. Free text is matched
//! against the configured keyword buckets with word-boundary regexes; liked
//! and disliked prospects contribute their industry and title. Matching is
//! pure pattern matching, so the same feedback always yields the same delta.
//!
//! Liked and disliked prospects are also kept as examples: later rounds
//! nudge each prospect's effective score by how much it resembles them.

use leadgen_config::RefinementVocabulary;
use leadgen_core::{CompanySizeCriterion, Icp, Prospect, ProspectStore};
use regex::Regex;
use serde::Serialize;

use crate::AgentError;

/// Exclusion key for industries
pub const EXCLUDED_INDUSTRIES: &str = "industries";
/// Exclusion key for job titles
pub const EXCLUDED_TITLES: &str = "titles";

const SAME_INDUSTRY_CREDIT: f64 = 0.05;
const SHARED_TITLE_WORD_CREDIT: f64 = 0.05;
const SAME_EMPLOYEE_RANGE_CREDIT: f64 = 0.03;
/// Cap on the boost and, separately, on the penalty
const MAX_SIMILARITY: f64 = 0.2;

/// Result of one refinement request
#[derive(Debug, Clone, Serialize)]
pub struct RefinementOutcome {
    pub updated_icp: Icp,
    pub changes_summary: Vec<String>,
    pub changed: bool,
    /// Liked and disliked prospects that were found in the store
    #[serde(skip)]
    pub examples: FeedbackExamples,
}

/// Reviewed prospects that later rounds are compared against
#[derive(Debug, Clone, Default)]
pub struct FeedbackExamples {
    pub liked: Vec<Prospect>,
    pub disliked: Vec<Prospect>,
}

impl FeedbackExamples {
    pub fn is_empty(&self) -> bool {
        self.liked.is_empty() && self.disliked.is_empty()
    }

    /// Resemblance to liked prospects minus resemblance to disliked ones.
    /// Each side is capped at 0.2.
    pub fn adjustment(&self, prospect: &Prospect) -> f64 {
        similarity(prospect, &self.liked) - similarity(prospect, &self.disliked)
    }
}

fn same_text(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.trim().eq_ignore_ascii_case(b.trim()))
}

/// Summed per-example credit for a shared industry, title word and
/// employee range. Missing values never match.
fn similarity(prospect: &Prospect, examples: &[Prospect]) -> f64 {
    let title = prospect.person.title().map(str::to_lowercase);
    let credit: f64 = examples
        .iter()
        .map(|example| {
            let mut credit = 0.0;
            if same_text(
                prospect.company.industry.as_deref(),
                example.company.industry.as_deref(),
            ) {
                credit += SAME_INDUSTRY_CREDIT;
            }
            if let (Some(title), Some(other)) = (&title, example.person.title()) {
                if other
                    .to_lowercase()
                    .split_whitespace()
                    .any(|word| title.contains(word))
                {
                    credit += SHARED_TITLE_WORD_CREDIT;
                }
            }
            if same_text(
                prospect.company.employee_range.as_deref(),
                example.company.employee_range.as_deref(),
            ) {
                credit += SAME_EMPLOYEE_RANGE_CREDIT;
            }
            credit
        })
        .sum();
    credit.min(MAX_SIMILARITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

struct IndustryPatterns {
    name: String,
    add: Regex,
    exclude: Regex,
}

struct RegionPattern {
    name: String,
    regex: Regex,
}

/// Deterministic feedback-to-criteria mapper
pub struct FeedbackRefiner {
    vocabulary: RefinementVocabulary,
    size_up: Option<Regex>,
    size_down: Option<Regex>,
    seniority_up: Option<Regex>,
    seniority_down: Option<Regex>,
    industries: Vec<IndustryPatterns>,
    regions: Vec<RegionPattern>,
}

/// `(?i)\b(?:a|b|c)\b`, or `None` for an empty bucket
fn phrase_regex(phrases: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| regex::escape(&p.to_lowercase()))
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).map(Some)
}

fn contains_ignore_case(items: &[String], value: &str) -> bool {
    items.iter().any(|item| item.eq_ignore_ascii_case(value))
}

fn push_unique(items: &mut Vec<String>, value: &str) -> bool {
    if contains_ignore_case(items, value) {
        return false;
    }
    items.push(value.to_string());
    true
}

/// Remove `value` from an exclusion list; true when something was removed
fn lift_exclusion(excluded: Option<&mut Vec<String>>, value: &str) -> bool {
    let Some(excluded) = excluded else {
        return false;
    };
    let before = excluded.len();
    excluded.retain(|e| !e.eq_ignore_ascii_case(value));
    excluded.len() != before
}

fn matches(regex: &Option<Regex>, text: &str) -> bool {
    regex.as_ref().is_some_and(|r| r.is_match(text))
}

impl FeedbackRefiner {
    pub fn new(vocabulary: RefinementVocabulary) -> Result<Self, AgentError> {
        let industries = vocabulary
            .known_industries
            .iter()
            .map(|name| {
                let escaped = regex::escape(&name.to_lowercase());
                Ok(IndustryPatterns {
                    name: name.clone(),
                    add: Regex::new(&format!(
                        r"(?i)\b(?:focus(?:ing)? on|more|in the|target(?:ing)?)\s+{}\b",
                        escaped
                    ))?,
                    exclude: Regex::new(&format!(
                        r"(?i)\b(?:no|not|exclude|excluding|avoid|without)\s+{}\b",
                        escaped
                    ))?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let regions = vocabulary
            .known_regions
            .iter()
            .map(|name| {
                Ok(RegionPattern {
                    name: name.clone(),
                    regex: Regex::new(&format!(
                        r"(?i)\b(?:in|based in|located in|from)\s+(?:the\s+)?{}\b",
                        regex::escape(&name.to_lowercase())
                    ))?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            size_up: phrase_regex(&vocabulary.size_up)?,
            size_down: phrase_regex(&vocabulary.size_down)?,
            seniority_up: phrase_regex(&vocabulary.seniority_up)?,
            seniority_down: phrase_regex(&vocabulary.seniority_down)?,
            industries,
            regions,
            vocabulary,
        })
    }

    /// Apply feedback to `icp`.
    ///
    /// Returns the input ICP untouched (same version) with `changed: false`
    /// when nothing actionable was found; otherwise the next ICP version
    /// with the feedback and change list appended to its history.
    pub fn refine(
        &self,
        icp: &Icp,
        feedback: &str,
        liked_ids: &[String],
        disliked_ids: &[String],
        store: &dyn ProspectStore,
    ) -> RefinementOutcome {
        let mut draft = icp.clone();
        let mut changes = Vec::new();

        self.apply_size(&mut draft, feedback, &mut changes);
        self.apply_seniority(&mut draft, feedback, &mut changes);
        self.apply_industries(&mut draft, feedback, &mut changes);
        self.apply_regions(&mut draft, feedback, &mut changes);

        let examples = FeedbackExamples {
            liked: self.lookup(liked_ids, store, "liked"),
            disliked: self.lookup(disliked_ids, store, "disliked"),
        };
        self.apply_prospect_feedback(&mut draft, &examples, &mut changes);

        let changed = !changes.is_empty();
        metrics::counter!(
            "leadgen_refinements_total",
            "changed" => if changed { "true" } else { "false" }
        )
        .increment(1);

        if !changed {
            tracing::info!(icp_id = %icp.id, version = icp.version, "Feedback produced no criteria change");
            return RefinementOutcome {
                updated_icp: icp.clone(),
                changes_summary: Vec::new(),
                changed: false,
                examples,
            };
        }

        let updated_icp = draft.with_feedback(feedback, changes.clone());
        tracing::info!(
            icp_id = %icp.id,
            from_version = icp.version,
            to_version = updated_icp.version,
            changes = changes.len(),
            "ICP refined"
        );

        RefinementOutcome {
            updated_icp,
            changes_summary: changes,
            changed: true,
            examples,
        }
    }

    fn apply_size(&self, icp: &mut Icp, feedback: &str, changes: &mut Vec<String>) {
        let direction = match (matches(&self.size_up, feedback), matches(&self.size_down, feedback)) {
            (true, false) => Direction::Up,
            (false, true) => Direction::Down,
            (true, true) => {
                tracing::warn!("Feedback asks for both larger and smaller companies, size unchanged");
                return;
            }
            (false, false) => return,
        };

        let current = icp.company_size.clone().unwrap_or_default();
        let next = match direction {
            Direction::Up => self
                .vocabulary
                .next_size_floor(current.min_employees)
                .map(|floor| CompanySizeCriterion {
                    min_employees: Some(floor),
                    max_employees: None,
                    ideal_employees: None,
                    ranges: Vec::new(),
                }),
            Direction::Down => self
                .vocabulary
                .next_size_ceiling(current.max_employees.or(current.min_employees))
                .map(|ceiling| CompanySizeCriterion {
                    min_employees: Some(1),
                    max_employees: Some(ceiling),
                    ideal_employees: None,
                    ranges: Vec::new(),
                }),
        };

        match next {
            Some(size) if size != current => {
                changes.push(match direction {
                    Direction::Up => format!(
                        "Company size minimum raised to {} employees",
                        size.min_employees.unwrap_or_default()
                    ),
                    Direction::Down => format!(
                        "Company size capped at {} employees",
                        size.max_employees.unwrap_or_default()
                    ),
                });
                icp.company_size = Some(size);
            }
            _ => tracing::debug!(?direction, "Company size already at the vocabulary limit"),
        }
    }

    fn apply_seniority(&self, icp: &mut Icp, feedback: &str, changes: &mut Vec<String>) {
        let (add, drop) = match (
            matches(&self.seniority_up, feedback),
            matches(&self.seniority_down, feedback),
        ) {
            (true, false) => (&self.vocabulary.senior_levels, &self.vocabulary.junior_levels),
            (false, true) => (&self.vocabulary.junior_levels, &self.vocabulary.senior_levels),
            (true, true) => {
                tracing::warn!("Feedback asks for both senior and junior contacts, seniority unchanged");
                return;
            }
            (false, false) => return,
        };

        let mut levels: Vec<String> = icp
            .seniority_levels
            .iter()
            .filter(|level| !contains_ignore_case(drop, level))
            .cloned()
            .collect();
        for level in add {
            push_unique(&mut levels, level);
        }

        if levels != icp.seniority_levels {
            changes.push(format!("Seniority levels set to {}", levels.join(", ")));
            icp.seniority_levels = levels;
        }
    }

    fn apply_industries(&self, icp: &mut Icp, feedback: &str, changes: &mut Vec<String>) {
        for industry in &self.industries {
            if industry.exclude.is_match(feedback) {
                let before = icp.industries.len();
                icp.industries.retain(|i| !i.eq_ignore_ascii_case(&industry.name));
                let excluded = icp.exclusions.entry(EXCLUDED_INDUSTRIES.to_string()).or_default();
                if push_unique(excluded, &industry.name) || icp.industries.len() != before {
                    changes.push(format!("Excluded industry: {}", industry.name));
                }
            } else if industry.add.is_match(feedback) {
                if push_unique(&mut icp.industries, &industry.name) {
                    changes.push(format!("Added industry: {}", industry.name));
                }
                lift_exclusion(icp.exclusions.get_mut(EXCLUDED_INDUSTRIES), &industry.name);
            }
        }
    }

    fn apply_regions(&self, icp: &mut Icp, feedback: &str, changes: &mut Vec<String>) {
        for region in &self.regions {
            if region.regex.is_match(feedback) && push_unique(&mut icp.geographic_regions, &region.name) {
                changes.push(format!("Added region: {}", region.name));
            }
        }
    }

    /// Liked prospects widen the targets. A disliked prospect only excludes
    /// its industry when that industry is not targeted; anything finer is
    /// left to the similarity penalty.
    fn apply_prospect_feedback(
        &self,
        icp: &mut Icp,
        examples: &FeedbackExamples,
        changes: &mut Vec<String>,
    ) {
        for prospect in &examples.liked {
            if let Some(industry) = prospect.company.industry.as_deref() {
                let added = push_unique(&mut icp.industries, industry);
                let lifted = lift_exclusion(icp.exclusions.get_mut(EXCLUDED_INDUSTRIES), industry);
                if added {
                    changes.push(format!("Added industry from liked prospect: {}", industry));
                } else if lifted {
                    changes.push(format!("Lifted industry exclusion for liked prospect: {}", industry));
                }
            }
            if let Some(title) = prospect.person.title() {
                if push_unique(&mut icp.target_roles, title) {
                    changes.push(format!("Added target role from liked prospect: {}", title));
                }
            }
        }

        for prospect in &examples.disliked {
            let Some(industry) = prospect.company.industry.as_deref() else {
                continue;
            };
            // liked industries were merged into the targets above
            if contains_ignore_case(&icp.industries, industry) {
                tracing::warn!(
                    prospect_id = %prospect.id,
                    industry,
                    "Disliked prospect is in a targeted industry, not excluding it"
                );
                continue;
            }
            let excluded = icp.exclusions.entry(EXCLUDED_INDUSTRIES.to_string()).or_default();
            if push_unique(excluded, industry) {
                changes.push(format!("Excluded industry from disliked prospect: {}", industry));
            }
        }
    }

    fn lookup(
        &self,
        ids: &[String],
        store: &dyn ProspectStore,
        kind: &str,
    ) -> Vec<Prospect> {
        let found = store.list_by_ids(ids);
        if found.len() < ids.len() {
            let missing: Vec<&str> = ids
                .iter()
                .filter(|id| !found.iter().any(|p| &p.id == *id))
                .map(String::as_str)
                .collect();
            tracing::warn!(kind, ?missing, "Feedback references unknown prospects");
        }
        found
    }
}
