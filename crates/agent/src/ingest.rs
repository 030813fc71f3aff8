//! Ingestion boundary
//!
//! Providers return loosely-shaped JSON. Each source gets one adapter that
//! maps its schema into the canonical `Company`/`Person` pair exactly once,
//! so nothing downstream ever looks up alternative field names.

use chrono::{DateTime, Utc};
use leadgen_core::{ActivityLevel, Company, Person, Post, Prospect, RawCandidate};
use serde_json::Value;

const UNKNOWN: &str = "Unknown";

/// Maps one provider's raw candidate into a canonical prospect
pub trait SourceAdapter: Send + Sync {
    fn normalize_company(&self, raw: &Value) -> Company;

    fn normalize_person(&self, raw: &Value) -> Person;

    /// Build a prospect with a fresh id
    fn normalize(&self, candidate: &RawCandidate) -> Prospect {
        Prospect::new(
            Prospect::generate_id(),
            self.normalize_company(&candidate.company),
            self.normalize_person(&candidate.person),
            candidate.source.clone(),
        )
    }
}

/// Company/people search provider records
#[derive(Debug, Clone, Copy, Default)]
pub struct PeopleSearchAdapter;

/// Web-search entity records
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSearchAdapter;

static PEOPLE_SEARCH: PeopleSearchAdapter = PeopleSearchAdapter;
static WEB_SEARCH: WebSearchAdapter = WebSearchAdapter;

/// Adapter for a source tag; unknown tags use the people-search schema
pub fn adapter_for(source: &str) -> &'static dyn SourceAdapter {
    match source.trim().to_lowercase().as_str() {
        "web" | "web_search" | "websets" | "exa" => &WEB_SEARCH,
        _ => &PEOPLE_SEARCH,
    }
}

/// Normalize a batch of raw candidates, each with its source's adapter
pub fn normalize_candidates(candidates: &[RawCandidate]) -> Vec<Prospect> {
    candidates
        .iter()
        .map(|candidate| adapter_for(&candidate.source).normalize(candidate))
        .collect()
}

/// Range descriptor for a head count
pub fn employee_range_for(count: u32) -> &'static str {
    match count {
        0..=10 => "1-10",
        11..=50 => "11-50",
        51..=200 => "51-200",
        201..=500 => "201-500",
        501..=1000 => "501-1000",
        1001..=5000 => "1001-5000",
        5001..=10000 => "5001-10000",
        _ => "10000+",
    }
}

/// Pair separately returned company and people lists: a person whose
/// employer name contains (or is contained in) the company name wins,
/// otherwise the person at the same index
pub fn pair_companies_and_people(
    companies: &[Value],
    people: &[Value],
    source: &str,
) -> Vec<RawCandidate> {
    companies
        .iter()
        .enumerate()
        .filter_map(|(i, company)| {
            let company_name = text(company, &["name"]).unwrap_or_default().to_lowercase();
            let by_name = people.iter().find(|person| {
                let employer = text(person, &["company", "company_name"])
                    .unwrap_or_default()
                    .to_lowercase();
                !company_name.is_empty()
                    && !employer.is_empty()
                    && (employer.contains(&company_name) || company_name.contains(&employer))
            });

            by_name.or_else(|| people.get(i)).map(|person| RawCandidate {
                company: company.clone(),
                person: person.clone(),
                source: source.to_string(),
            })
        })
        .collect()
}

// Field access helpers

fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => obj
            .get("value")
            .or_else(|| obj.get("name"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        _ => None,
    })
}

fn list(raw: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        match raw.get(*key) {
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.trim().to_string()),
                        Value::Object(obj) => obj
                            .get("name")
                            .and_then(Value::as_str)
                            .map(|s| s.trim().to_string()),
                        _ => None,
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return s
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
    }
    Vec::new()
}

fn count(raw: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

fn timestamp(raw: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    text(raw, keys)
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn posts(raw: &Value) -> Vec<Post> {
    let items = match raw.get("recent_posts").or_else(|| raw.get("posts")) {
        Some(Value::Array(items)) => items,
        _ => return Vec::new(),
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(Post::new(s.clone())),
            Value::Object(_) => text(item, &["content", "text"]).map(|content| Post {
                content,
                timestamp: timestamp(item, &["timestamp", "date", "posted_at"]),
            }),
            _ => None,
        })
        .collect()
}

/// Split "Jane van Doe" into ("Jane", "van Doe")
fn split_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or(UNKNOWN).to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Size fields hold a number, a numeric string or a range descriptor
fn company_size(raw: &Value) -> (Option<u32>, Option<String>) {
    for key in ["employee_count", "employees", "size", "company_size"] {
        match raw.get(key) {
            Some(Value::Number(_)) => {
                if let Some(n) = count(raw, &[key]) {
                    return (Some(n), Some(employee_range_for(n).to_string()));
                }
            }
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return match s.trim().parse::<u32>() {
                    Ok(n) => (Some(n), Some(employee_range_for(n).to_string())),
                    Err(_) => (None, Some(s.trim().to_string())),
                };
            }
            _ => {}
        }
    }
    (None, text(raw, &["employee_range", "employee_count_range"]))
}

fn base_person(raw: &Value, title_keys: &[&str]) -> Person {
    let (first_name, last_name) = match text(raw, &["first_name"]) {
        Some(first) => (first, text(raw, &["last_name"]).unwrap_or_default()),
        None => split_name(&text(raw, &["name", "full_name"]).unwrap_or_else(|| UNKNOWN.into())),
    };

    Person {
        first_name,
        last_name,
        email: text(raw, &["email"]),
        title: text(raw, title_keys),
        department: text(raw, &["department"]),
        seniority_level: text(raw, &["seniority_level", "seniority"]),
        years_experience: count(raw, &["years_experience", "experience_years"]),
        years_at_company: count(raw, &["years_at_company", "tenure_years"]),
        skills: list(raw, &["skills"]),
        recent_posts: posts(raw),
        last_post_date: timestamp(raw, &["last_post_date", "last_active"]),
        activity_level: text(raw, &["activity_level"]).and_then(|a| ActivityLevel::parse(&a)),
    }
}

impl SourceAdapter for PeopleSearchAdapter {
    fn normalize_company(&self, raw: &Value) -> Company {
        let (employee_count, employee_range) = company_size(raw);
        let headquarters = text(raw, &["location", "headquarters", "headquarter_location"]);
        let mut locations = list(raw, &["locations"]);
        if locations.is_empty() {
            locations.extend(headquarters.clone());
        }

        Company {
            name: text(raw, &["name"]).unwrap_or_else(|| UNKNOWN.into()),
            domain: text(raw, &["website", "domain"]),
            linkedin_url: text(raw, &["linkedin_url", "url"]),
            industry: text(raw, &["industry"]),
            employee_count,
            employee_range,
            revenue: text(raw, &["revenue"]),
            headquarters,
            locations,
            tech_stack: list(raw, &["tech_stack", "technologies"]),
            funding_stage: text(raw, &["funding_stage", "funding"]),
        }
    }

    fn normalize_person(&self, raw: &Value) -> Person {
        base_person(raw, &["title", "role", "job_title", "headline"])
    }
}

/// Host part of a URL, without scheme or `www.`
fn host(url: &str) -> Option<String> {
    let rest = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    rest.split(|c: char| c == '/' || c == '?' || c == '#' || c == ':')
        .next()
        .filter(|h| !h.is_empty())
        .map(str::to_lowercase)
}

impl SourceAdapter for WebSearchAdapter {
    fn normalize_company(&self, raw: &Value) -> Company {
        let (employee_count, employee_range) = company_size(raw);
        let domain = text(raw, &["domain"]).or_else(|| text(raw, &["url", "website"]).and_then(|u| host(&u)));
        let headquarters = text(raw, &["location", "headquarters"]);

        Company {
            name: text(raw, &["name", "title"]).unwrap_or_else(|| UNKNOWN.into()),
            domain,
            linkedin_url: text(raw, &["linkedin_url"]),
            industry: text(raw, &["industry", "category"]),
            employee_count,
            employee_range,
            revenue: text(raw, &["revenue"]),
            locations: headquarters.iter().cloned().collect(),
            headquarters,
            tech_stack: list(raw, &["tech_stack", "technologies"]),
            funding_stage: text(raw, &["funding_stage", "funding"]),
        }
    }

    fn normalize_person(&self, raw: &Value) -> Person {
        base_person(raw, &["title", "role", "job_title", "position"])
    }
}
