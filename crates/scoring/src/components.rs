//! Component scorers
//!
//! Four independent sub-scores, each a weighted average of matcher outputs.
//! A criterion only enters the average when both the prospect and the ICP
//! carry data for it; weights are renormalized over what is present.

use chrono::{DateTime, Utc};
use leadgen_config::ScoringConfig;
use leadgen_core::{ActivityLevel, Company, Icp, Person, Prospect};

use crate::matchers;

const ENGAGEMENT_BASE: f64 = 0.5;
const RECENT_JOB_CHANGE: f64 = 0.8;
const FUNDED_COMPANY: f64 = 0.7;
const RELATED_TECH_CREDIT: f64 = 0.2;

/// Weighted average that falls back to `neutral` when nothing was compared
#[derive(Debug, Default)]
struct WeightedParts {
    parts: Vec<(f64, f64)>,
}

impl WeightedParts {
    fn push(&mut self, score: f64, weight: f64) {
        self.parts.push((score, weight));
    }

    fn average(&self, neutral: f64) -> f64 {
        let total_weight: f64 = self.parts.iter().map(|(_, w)| w).sum();
        if total_weight <= 0.0 {
            return neutral;
        }
        let weighted: f64 = self.parts.iter().map(|(s, w)| s * w).sum();
        (weighted / total_weight).clamp(0.0, 1.0)
    }
}

/// Company fit: industry, size, tech stack and geography
pub fn score_company_match(company: &Company, icp: &Icp, config: &ScoringConfig) -> f64 {
    let weights = &config.company_components;
    let mut parts = WeightedParts::default();

    let industry = company.industry.as_deref().filter(|i| !i.trim().is_empty());
    if !icp.industries.is_empty() && industry.is_some() {
        parts.push(
            matchers::match_industry(industry, &icp.industries),
            weights.industry,
        );
    }

    let size_criterion = icp.company_size.as_ref().filter(|c| !c.is_empty());
    if size_criterion.is_some() && matchers::estimate_employee_count(company).is_some() {
        parts.push(
            matchers::match_company_size(company, size_criterion, config.defaults.size_no_criterion),
            weights.size,
        );
    }

    if !icp.tech_stack.is_empty() && !company.tech_stack.is_empty() {
        parts.push(
            matchers::match_tech_stack(&company.tech_stack, &icp.tech_stack),
            weights.tech_stack,
        );
    }

    if !icp.geographic_regions.is_empty() && !company.locations.is_empty() {
        parts.push(
            matchers::match_geography(&company.locations, &icp.geographic_regions),
            weights.geography,
        );
    }

    parts.average(config.defaults.company_neutral)
}

/// Person fit: role, seniority, skills and experience.
///
/// The title is a required attribute: when the ICP targets roles and the
/// person has no title, the role part still counts, at 0.0.
pub fn score_person_match(person: &Person, icp: &Icp, config: &ScoringConfig) -> f64 {
    let weights = &config.person_components;
    let mut parts = WeightedParts::default();

    if !icp.target_roles.is_empty() {
        parts.push(
            matchers::match_role(person.title(), &icp.target_roles),
            weights.role,
        );
    }

    let seniority = person
        .seniority_level
        .as_deref()
        .filter(|s| !s.trim().is_empty());
    if !icp.seniority_levels.is_empty() && seniority.is_some() {
        parts.push(
            matchers::match_seniority(seniority, &icp.seniority_levels),
            weights.seniority,
        );
    }

    if !icp.tools_used.is_empty() && !person.skills.is_empty() {
        parts.push(
            matchers::match_skills(&person.skills, &icp.tools_used),
            weights.skills,
        );
    }

    if let Some(years) = person.years_experience {
        parts.push(matchers::match_experience(years), weights.experience);
    }

    parts.average(config.defaults.person_neutral)
}

/// Fraction of posts mentioning any pain point, one credit per post
pub fn pain_point_mention_rate(person: &Person, pain_points: &[String]) -> f64 {
    let pain_points: Vec<String> = pain_points
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    if person.recent_posts.is_empty() || pain_points.is_empty() {
        return 0.0;
    }

    let mentions = person
        .recent_posts
        .iter()
        .filter(|post| {
            let content = post.content.to_lowercase();
            pain_points.iter().any(|p| content.contains(p.as_str()))
        })
        .count();

    mentions as f64 / person.recent_posts.len() as f64
}

/// Readiness to adopt the ICP's technologies, judged by related
/// technologies already in the company stack
pub fn tech_adoption_intent(company: &Company, icp: &Icp, config: &ScoringConfig) -> f64 {
    if company.tech_stack.is_empty() || icp.tech_stack.is_empty() {
        return 0.0;
    }
    let current: Vec<String> = company
        .tech_stack
        .iter()
        .map(|t| t.trim().to_lowercase())
        .collect();

    let ready = icp
        .tech_stack
        .iter()
        .filter(|target| {
            config
                .related_technologies(target)
                .iter()
                .any(|related| current.contains(&related.to_lowercase()))
        })
        .count();

    (ready as f64 * RELATED_TECH_CREDIT).min(1.0)
}

/// Buying intent: mean of whichever signals are available
pub fn score_buying_intent(prospect: &Prospect, icp: &Icp, config: &ScoringConfig) -> f64 {
    let company = &prospect.company;
    let person = &prospect.person;
    let mut signals = Vec::with_capacity(4);

    if person.years_at_company.map_or(false, |years| years <= 1) {
        signals.push(RECENT_JOB_CHANGE);
    }

    let funded = company
        .funding_stage
        .as_deref()
        .map_or(false, |stage| stage.to_lowercase().contains("series"));
    if funded {
        signals.push(FUNDED_COMPANY);
    }

    if !person.recent_posts.is_empty() && !icp.pain_points.is_empty() {
        signals.push(pain_point_mention_rate(person, &icp.pain_points));
    }

    if !company.tech_stack.is_empty() && !icp.tech_stack.is_empty() {
        signals.push(tech_adoption_intent(company, icp, config));
    }

    if signals.is_empty() {
        return config.defaults.intent_no_signal;
    }
    (signals.iter().sum::<f64>() / signals.len() as f64).clamp(0.0, 1.0)
}

/// Engagement from posting recency, activity level and post volume.
///
/// `now` is the reference instant for recency, passed in so repeated
/// scoring of the same input is reproducible.
pub fn score_engagement(person: &Person, now: DateTime<Utc>) -> f64 {
    let mut score = ENGAGEMENT_BASE;

    if let Some(last_post) = person.last_post_date {
        let days = (now - last_post).num_days();
        if days <= 7 {
            score += 0.3;
        } else if days <= 30 {
            score += 0.1;
        }
    }

    score += match person.activity_level {
        Some(ActivityLevel::High) => 0.3,
        Some(ActivityLevel::Medium) => 0.1,
        Some(ActivityLevel::Low) => -0.1,
        None => 0.0,
    };

    score += (person.recent_posts.len() as f64 * 0.05).min(0.2);

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use leadgen_core::{CompanySizeCriterion, Post};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_company_neutral_without_criteria() {
        let config = ScoringConfig::default();
        let icp = Icp::new("icp", "Empty");
        assert_eq!(score_company_match(&Company::named("Acme"), &icp, &config), 0.5);
    }

    #[test]
    fn test_company_renormalizes_present_parts() {
        let config = ScoringConfig::default();
        let mut icp = Icp::new("icp", "Tech");
        icp.industries = strings(&["Technology"]);
        icp.company_size = Some(CompanySizeCriterion::between(50, 500));
        icp.geographic_regions = strings(&["Germany"]);

        let company = Company {
            industry: Some("Technology".into()),
            employee_count: Some(150),
            ..Company::named("Acme")
        };
        // locations missing: geography drops out, (0.4*1 + 0.3*0.8) / 0.7
        let score = score_company_match(&company, &icp, &config);
        assert!(approx(score, 0.64 / 0.7), "score = {}", score);
    }

    #[test]
    fn test_person_missing_title_counts_as_zero() {
        let config = ScoringConfig::default();
        let mut icp = Icp::new("icp", "Roles");
        icp.target_roles = strings(&["CTO"]);
        icp.seniority_levels = strings(&["C-Level"]);

        let person = Person {
            seniority_level: Some("C-Level".into()),
            ..Default::default()
        };
        // (0.4*0 + 0.3*1) / 0.7
        let score = score_person_match(&person, &icp, &config);
        assert!(approx(score, 0.3 / 0.7), "score = {}", score);
    }

    #[test]
    fn test_zero_years_experience_is_data() {
        let config = ScoringConfig::default();
        let icp = Icp::new("icp", "Empty");
        let person = Person {
            years_experience: Some(0),
            ..Default::default()
        };
        assert_eq!(score_person_match(&person, &icp, &config), 0.5);

        let person = Person {
            years_experience: Some(5),
            ..Default::default()
        };
        assert_eq!(score_person_match(&person, &icp, &config), 1.0);
    }

    #[test]
    fn test_intent_default_without_signals() {
        let config = ScoringConfig::default();
        let prospect = Prospect::new("p", Company::named("Acme"), Person::default(), "test");
        let icp = Icp::new("icp", "Empty");
        assert_eq!(score_buying_intent(&prospect, &icp, &config), 0.3);
    }

    #[test]
    fn test_intent_averages_signals() {
        let config = ScoringConfig::default();
        let mut icp = Icp::new("icp", "Intent");
        icp.pain_points = strings(&["manual reporting"]);

        let company = Company {
            funding_stage: Some("Series B".into()),
            ..Company::named("Acme")
        };
        let person = Person {
            years_at_company: Some(1),
            recent_posts: vec![
                Post::new("Tired of Manual Reporting every week"),
                Post::new("Hiring!"),
            ],
            ..Default::default()
        };
        let prospect = Prospect::new("p", company, person, "test");
        // (0.8 + 0.7 + 0.5) / 3
        let score = score_buying_intent(&prospect, &icp, &config);
        assert!(approx(score, 2.0 / 3.0), "score = {}", score);
    }

    #[test]
    fn test_pain_point_one_credit_per_post() {
        let person = Person {
            recent_posts: vec![Post::new("security and compliance headaches")],
            ..Default::default()
        };
        let rate = pain_point_mention_rate(&person, &strings(&["security", "compliance"]));
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn test_tech_adoption_credit() {
        let config = ScoringConfig::default();
        let mut icp = Icp::new("icp", "Tech");
        icp.tech_stack = strings(&["Kubernetes", "AWS", "Rust"]);
        let company = Company {
            tech_stack: strings(&["Docker", "DevOps"]),
            ..Company::named("Acme")
        };
        let score = tech_adoption_intent(&company, &icp, &config);
        assert!(approx(score, 0.4), "score = {}", score);
    }

    #[test]
    fn test_engagement_components() {
        let now = Utc::now();
        let person = Person {
            last_post_date: Some(now - Duration::days(3)),
            activity_level: Some(ActivityLevel::Medium),
            recent_posts: vec![Post::new("a"), Post::new("b")],
            ..Default::default()
        };
        // 0.5 + 0.3 + 0.1 + 0.1
        assert!(approx(score_engagement(&person, now), 1.0));

        let quiet = Person {
            last_post_date: Some(now - Duration::days(90)),
            activity_level: Some(ActivityLevel::Low),
            ..Default::default()
        };
        assert!(approx(score_engagement(&quiet, now), 0.4));
    }

    #[test]
    fn test_engagement_clamped() {
        let now = Utc::now();
        let person = Person {
            last_post_date: Some(now),
            activity_level: Some(ActivityLevel::High),
            recent_posts: (0..10).map(|i| Post::new(format!("post {}", i))).collect(),
            ..Default::default()
        };
        assert_eq!(score_engagement(&person, now), 1.0);
    }
}
