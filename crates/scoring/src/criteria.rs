//! Per-criterion scores
//!
//! Every named criterion in the ICP is evaluated against the prospect
//! attribute its name designates. The resulting map is informational and
//! never feeds the total score.

use std::collections::BTreeMap;

use leadgen_config::ScoringConfig;
use leadgen_core::{CompanySizeCriterion, Criterion, Icp, Prospect};

use crate::matchers;

const REQUIRED_MET: f64 = 1.0;
const REQUIRED_UNMET: f64 = 0.0;
const OPTIONAL_MET: f64 = 0.8;
const OPTIONAL_UNMET: f64 = 0.2;

/// Prospect attribute a criterion name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionAttribute {
    Industry,
    CompanySize,
    TechStack,
    Location,
    Role,
    Seniority,
    Department,
    Skills,
    Funding,
    /// Name designates no known attribute; values are searched as free text
    Unknown,
}

impl CriterionAttribute {
    /// Resolve a criterion name, ignoring case and `_`/`-`/space differences
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match key.as_str() {
            "industry" | "industries" => Self::Industry,
            "company_size" | "size" | "employees" | "employee_count" => Self::CompanySize,
            "tech_stack" | "technology" | "technologies" => Self::TechStack,
            "location" | "locations" | "geography" | "region" | "regions" => Self::Location,
            "role" | "roles" | "title" | "job_title" => Self::Role,
            "seniority" | "seniority_level" => Self::Seniority,
            "department" | "departments" => Self::Department,
            "skills" | "tools" => Self::Skills,
            "funding" | "funding_stage" => Self::Funding,
            _ => Self::Unknown,
        }
    }
}

fn has_data(prospect: &Prospect, attribute: CriterionAttribute) -> bool {
    let company = &prospect.company;
    let person = &prospect.person;
    let present = |value: &Option<String>| value.as_deref().map_or(false, |v| !v.trim().is_empty());

    match attribute {
        CriterionAttribute::Industry => present(&company.industry),
        CriterionAttribute::CompanySize => matchers::estimate_employee_count(company).is_some(),
        CriterionAttribute::TechStack => !company.tech_stack.is_empty(),
        CriterionAttribute::Location => !company.locations.is_empty(),
        CriterionAttribute::Role => person.title().is_some(),
        CriterionAttribute::Seniority => present(&person.seniority_level),
        CriterionAttribute::Department => present(&person.department),
        CriterionAttribute::Skills => !person.skills.is_empty(),
        CriterionAttribute::Funding => present(&company.funding_stage),
        CriterionAttribute::Unknown => false,
    }
}

fn value_matches(
    prospect: &Prospect,
    attribute: CriterionAttribute,
    value: &str,
    config: &ScoringConfig,
) -> bool {
    let company = &prospect.company;
    let person = &prospect.person;
    let single = [value.to_string()];
    let needle = value.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    match attribute {
        CriterionAttribute::Industry => {
            matchers::match_industry(company.industry.as_deref(), &single) > 0.0
        }
        CriterionAttribute::CompanySize => {
            let criterion = CompanySizeCriterion {
                ranges: single.to_vec(),
                ..Default::default()
            };
            matchers::match_company_size(
                company,
                Some(&criterion),
                config.defaults.size_no_criterion,
            ) > 0.0
        }
        CriterionAttribute::TechStack => matchers::match_tech_stack(&company.tech_stack, &single) > 0.0,
        CriterionAttribute::Location => matchers::match_geography(&company.locations, &single) > 0.0,
        CriterionAttribute::Role => matchers::match_role(person.title(), &single) > 0.0,
        CriterionAttribute::Seniority => {
            matchers::match_seniority(person.seniority_level.as_deref(), &single) > 0.0
        }
        CriterionAttribute::Department => person
            .department
            .as_deref()
            .map_or(false, |d| d.trim().to_lowercase() == needle),
        CriterionAttribute::Skills => matchers::match_skills(&person.skills, &single) > 0.0,
        CriterionAttribute::Funding => company
            .funding_stage
            .as_deref()
            .map_or(false, |stage| stage.to_lowercase().contains(&needle)),
        CriterionAttribute::Unknown => free_text(prospect).any(|text| text.contains(&needle)),
    }
}

/// Lowercased searchable text for criteria naming no known attribute
fn free_text(prospect: &Prospect) -> impl Iterator<Item = String> + '_ {
    let company = &prospect.company;
    let person = &prospect.person;

    std::iter::once(Some(company.name.as_str()))
        .chain([
            company.industry.as_deref(),
            person.title.as_deref(),
            person.department.as_deref(),
        ])
        .flatten()
        .chain(person.skills.iter().map(String::as_str))
        .chain(company.tech_stack.iter().map(String::as_str))
        .map(str::to_lowercase)
}

/// Whether the prospect meets one named criterion
pub fn criterion_met(
    name: &str,
    criterion: &Criterion,
    prospect: &Prospect,
    config: &ScoringConfig,
) -> bool {
    let attribute = CriterionAttribute::from_name(name);
    if criterion.values.iter().all(|v| v.trim().is_empty()) {
        return has_data(prospect, attribute);
    }
    criterion
        .values
        .iter()
        .any(|value| value_matches(prospect, attribute, value, config))
}

/// Required criteria hard-fail only their own entry; optional ones keep
/// partial credit
pub fn criterion_score(criterion: &Criterion, met: bool) -> f64 {
    match (criterion.required, met) {
        (true, true) => REQUIRED_MET,
        (true, false) => REQUIRED_UNMET,
        (false, true) => OPTIONAL_MET,
        (false, false) => OPTIONAL_UNMET,
    }
}

/// Score every company and person criterion of the ICP
pub fn score_criteria(
    prospect: &Prospect,
    icp: &Icp,
    config: &ScoringConfig,
) -> BTreeMap<String, f64> {
    icp.all_criteria()
        .into_iter()
        .map(|(name, criterion)| {
            let met = criterion_met(&name, &criterion, prospect, config);
            let score = criterion_score(&criterion, met);
            (name, score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgen_core::{Company, Person};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn prospect() -> Prospect {
        let company = Company {
            industry: Some("Fintech".into()),
            employee_count: Some(300),
            tech_stack: strings(&["Rust", "Postgres"]),
            funding_stage: Some("Series A".into()),
            ..Company::named("Ledgerly")
        };
        let person = Person {
            department: Some("Engineering".into()),
            ..Person::with_title("VP Engineering")
        };
        Prospect::new("p1", company, person, "test")
    }

    #[test]
    fn test_attribute_name_resolution() {
        assert_eq!(CriterionAttribute::from_name("Job-Title"), CriterionAttribute::Role);
        assert_eq!(CriterionAttribute::from_name("company size"), CriterionAttribute::CompanySize);
        assert_eq!(CriterionAttribute::from_name("Funding_Stage"), CriterionAttribute::Funding);
        assert_eq!(CriterionAttribute::from_name("culture"), CriterionAttribute::Unknown);
    }

    #[test]
    fn test_required_and_optional_scores() {
        let config = ScoringConfig::default();
        let mut icp = Icp::new("icp", "Criteria");
        icp.company_criteria.insert(
            "industry".into(),
            Criterion::new(0.5, true, strings(&["fintech"])),
        );
        icp.company_criteria.insert(
            "size".into(),
            Criterion::new(0.3, true, strings(&["1001-5000"])),
        );
        icp.person_criteria.insert(
            "title".into(),
            Criterion::new(0.4, false, strings(&["CTO"])),
        );
        icp.person_criteria.insert(
            "department".into(),
            Criterion::new(0.2, false, strings(&["engineering"])),
        );

        let scores = score_criteria(&prospect(), &icp, &config);
        assert_eq!(scores["industry"], 1.0);
        assert_eq!(scores["size"], 0.0);
        assert_eq!(scores["title"], 0.2);
        assert_eq!(scores["department"], 0.8);
    }

    #[test]
    fn test_empty_values_check_presence() {
        let config = ScoringConfig::default();
        let criterion = Criterion::new(1.0, true, vec![]);
        assert!(criterion_met("funding", &criterion, &prospect(), &config));
        assert!(!criterion_met("seniority", &criterion, &prospect(), &config));
        assert!(!criterion_met("culture", &criterion, &prospect(), &config));
    }

    #[test]
    fn test_unknown_name_searches_free_text() {
        let config = ScoringConfig::default();
        let criterion = Criterion::new(1.0, false, strings(&["postgres"]));
        assert!(criterion_met("data platform", &criterion, &prospect(), &config));

        let criterion = Criterion::new(1.0, false, strings(&["salesforce"]));
        assert!(!criterion_met("data platform", &criterion, &prospect(), &config));
    }

    #[test]
    fn test_no_criteria_yields_empty_map() {
        let config = ScoringConfig::default();
        let icp = Icp::new("icp", "Empty");
        assert!(score_criteria(&prospect(), &icp, &config).is_empty());
    }
}
