//! Criteria matchers
//!
//! Each matcher compares one prospect attribute against one ICP criterion
//! and returns a score in [0, 1]. Matchers are pure: an empty value on
//! either side scores 0.0, except company size which is neutral when the
//! ICP sets no size criterion.

use leadgen_core::{Company, CompanySizeCriterion};

/// Inside the range but not near the ideal size
const SIZE_IN_RANGE: f64 = 0.8;
/// Share of the ideal size still counted as a perfect fit
const SIZE_IDEAL_TOLERANCE: f64 = 0.2;
/// Ceiling for sizes outside the range, scaled by distance
const SIZE_OUT_OF_RANGE: f64 = 0.5;
/// Title shares a word with a target role
const ROLE_PARTIAL: f64 = 0.7;

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn lowered(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_lowercase()).collect()
}

/// Fraction of `targets` present in `values`, case-insensitive
fn overlap_ratio(values: &[String], targets: &[String]) -> f64 {
    if values.is_empty() || targets.is_empty() {
        return 0.0;
    }
    let values = lowered(values);
    let matched = lowered(targets)
        .iter()
        .filter(|target| values.contains(target))
        .count();
    matched as f64 / targets.len() as f64
}

/// Exact case-insensitive industry membership
pub fn match_industry(industry: Option<&str>, targets: &[String]) -> f64 {
    match industry.map(str::trim).filter(|i| !i.is_empty()) {
        Some(industry) if targets.iter().any(|t| eq_ignore_case(t, industry)) => 1.0,
        _ => 0.0,
    }
}

/// Parse a range descriptor such as "51-200", "10000+", "1,001-5,000" or
/// "51-200 employees" into `(low, high)`; `high` is `None` for open ranges
pub fn parse_employee_range(descriptor: &str) -> Option<(u32, Option<u32>)> {
    let cleaned: String = descriptor.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();

    let mut numbers = cleaned
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse::<u32>().ok());

    let low = numbers.next()?;
    match numbers.next() {
        Some(high) if high >= low => Some((low, Some(high))),
        Some(_) => None,
        None if cleaned.contains('+') => Some((low, None)),
        None => Some((low, Some(low))),
    }
}

/// Best numeric estimate of a company's head count: the exact count, else
/// the midpoint of its range (lower bound for open ranges)
pub fn estimate_employee_count(company: &Company) -> Option<u32> {
    if let Some(count) = company.employee_count {
        return Some(count);
    }
    let (low, high) = parse_employee_range(company.employee_range.as_deref()?)?;
    Some(match high {
        Some(high) => low + (high - low) / 2,
        None => low,
    })
}

fn normalize_range(descriptor: &str) -> String {
    descriptor
        .to_lowercase()
        .replace("employees", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect()
}

/// Company size against the ICP size criterion
///
/// Numeric bounds: inside `[min, max]` scores 0.8, or 1.0 within 20% of the
/// ideal size; outside, the score falls off with the ratio to the nearest
/// bound. A criterion carrying only range descriptors is a membership test.
pub fn match_company_size(
    company: &Company,
    criterion: Option<&CompanySizeCriterion>,
    no_criterion: f64,
) -> f64 {
    let criterion = match criterion {
        Some(c) if !c.is_empty() => c,
        _ => return no_criterion,
    };

    let has_bounds = criterion.min_employees.is_some()
        || criterion.max_employees.is_some()
        || criterion.ideal_employees.is_some();

    if !has_bounds {
        return match_size_ranges(company, &criterion.ranges);
    }

    let count = match estimate_employee_count(company) {
        Some(count) => count,
        None => return 0.0,
    };

    let min = criterion.min_employees.unwrap_or(0);
    let max = criterion.max_employees.unwrap_or(u32::MAX);

    if (min..=max).contains(&count) {
        if let Some(ideal) = criterion.ideal_employees.filter(|i| *i > 0) {
            let distance = (f64::from(count) - f64::from(ideal)).abs();
            if distance <= f64::from(ideal) * SIZE_IDEAL_TOLERANCE {
                return 1.0;
            }
        }
        return SIZE_IN_RANGE;
    }

    let ratio = if count < min {
        f64::from(count) / f64::from(min)
    } else {
        f64::from(max) / f64::from(count)
    };
    (ratio * SIZE_OUT_OF_RANGE).clamp(0.0, SIZE_OUT_OF_RANGE)
}

fn match_size_ranges(company: &Company, ranges: &[String]) -> f64 {
    if let Some(range) = company.employee_range.as_deref() {
        let normalized = normalize_range(range);
        if ranges.iter().any(|r| normalize_range(r) == normalized) {
            return 1.0;
        }
    }

    let count = match estimate_employee_count(company) {
        Some(count) => count,
        None => return 0.0,
    };

    let inside = ranges
        .iter()
        .filter_map(|r| parse_employee_range(r))
        .any(|(low, high)| count >= low && high.map_or(true, |high| count <= high));

    if inside {
        1.0
    } else {
        0.0
    }
}

/// Share of the target technologies the company already runs
pub fn match_tech_stack(company_tech: &[String], targets: &[String]) -> f64 {
    overlap_ratio(company_tech, targets)
}

/// Share of target regions named (as a substring) by any company location
pub fn match_geography(locations: &[String], regions: &[String]) -> f64 {
    if locations.is_empty() || regions.is_empty() {
        return 0.0;
    }
    let locations = lowered(locations);
    let matched = lowered(regions)
        .iter()
        .filter(|region| locations.iter().any(|loc| loc.contains(region.as_str())))
        .count();
    matched as f64 / regions.len() as f64
}

/// Title against target roles: exact match 1.0, shared word 0.7, else 0.0
pub fn match_role(title: Option<&str>, roles: &[String]) -> f64 {
    let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => title.to_lowercase(),
        None => return 0.0,
    };

    if roles.iter().any(|role| eq_ignore_case(role, &title)) {
        return 1.0;
    }

    let partial = roles.iter().any(|role| {
        role.to_lowercase()
            .split_whitespace()
            .any(|word| title.contains(word))
    });

    if partial {
        ROLE_PARTIAL
    } else {
        0.0
    }
}

/// Exact case-insensitive seniority membership, no partial credit
pub fn match_seniority(level: Option<&str>, levels: &[String]) -> f64 {
    match level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) if levels.iter().any(|l| eq_ignore_case(l, level)) => 1.0,
        _ => 0.0,
    }
}

/// Share of the target tools listed among the person's skills
pub fn match_skills(skills: &[String], tools: &[String]) -> f64 {
    overlap_ratio(skills, tools)
}

/// Experience fit: 3-15 years is ideal
pub fn match_experience(years: u32) -> f64 {
    match years {
        3..=15 => 1.0,
        1..=2 => 0.7,
        16..=25 => 0.8,
        _ => 0.5,
    }
}
