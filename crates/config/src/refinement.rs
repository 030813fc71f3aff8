//! Feedback vocabulary
//!
//! Keyword buckets the refiner matches free-text feedback against. Phrases
//! are matched lowercased on word boundaries, so entries here are plain
//! lowercase words or short phrases.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementVocabulary {
    /// Phrases asking for larger companies
    #[serde(default = "default_size_up")]
    pub size_up: Vec<String>,
    #[serde(default = "default_size_down")]
    pub size_down: Vec<String>,
    #[serde(default = "default_seniority_up")]
    pub seniority_up: Vec<String>,
    #[serde(default = "default_seniority_down")]
    pub seniority_down: Vec<String>,

    /// Seniority levels merged in on a seniority-up request
    #[serde(default = "default_senior_levels")]
    pub senior_levels: Vec<String>,
    #[serde(default = "default_junior_levels")]
    pub junior_levels: Vec<String>,

    /// Industries recognised in "focus on X" / "no X" phrases
    #[serde(default = "default_known_industries")]
    pub known_industries: Vec<String>,
    #[serde(default = "default_known_regions")]
    pub known_regions: Vec<String>,

    /// Lower bounds a size-up request steps through
    #[serde(default = "default_size_floors")]
    pub size_floors: Vec<u32>,
    /// Upper bounds a size-down request steps through
    #[serde(default = "default_size_ceilings")]
    pub size_ceilings: Vec<u32>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_size_up() -> Vec<String> {
    strings(&["bigger", "larger", "enterprise", "more employees"])
}

fn default_size_down() -> Vec<String> {
    strings(&[
        "smaller",
        "startup",
        "startups",
        "small business",
        "fewer employees",
    ])
}

fn default_seniority_up() -> Vec<String> {
    strings(&[
        "senior",
        "executive",
        "executives",
        "c-level",
        "decision maker",
        "decision makers",
        "leadership",
    ])
}

fn default_seniority_down() -> Vec<String> {
    strings(&["junior", "individual contributor", "hands-on"])
}

fn default_senior_levels() -> Vec<String> {
    strings(&["Director", "VP", "C-Level"])
}

fn default_junior_levels() -> Vec<String> {
    strings(&["Entry", "Mid", "Senior"])
}

fn default_known_industries() -> Vec<String> {
    strings(&[
        "Technology",
        "Software",
        "SaaS",
        "Fintech",
        "Healthcare",
        "Finance",
        "Retail",
        "Manufacturing",
        "Education",
        "E-commerce",
        "Marketing",
    ])
}

fn default_known_regions() -> Vec<String> {
    strings(&[
        "United States",
        "Canada",
        "United Kingdom",
        "Europe",
        "Germany",
        "France",
        "India",
        "APAC",
        "North America",
        "EMEA",
    ])
}

fn default_size_floors() -> Vec<u32> {
    vec![11, 51, 201, 501, 1001, 5001, 10001]
}

fn default_size_ceilings() -> Vec<u32> {
    vec![10, 50, 200, 500, 1000, 5000, 10000]
}

impl Default for RefinementVocabulary {
    fn default() -> Self {
        Self {
            size_up: default_size_up(),
            size_down: default_size_down(),
            seniority_up: default_seniority_up(),
            seniority_down: default_seniority_down(),
            senior_levels: default_senior_levels(),
            junior_levels: default_junior_levels(),
            known_industries: default_known_industries(),
            known_regions: default_known_regions(),
            size_floors: default_size_floors(),
            size_ceilings: default_size_ceilings(),
        }
    }
}

impl RefinementVocabulary {
    /// Next size floor strictly above `current_min`, or the default mid-market
    /// floor when no minimum is set
    pub fn next_size_floor(&self, current_min: Option<u32>) -> Option<u32> {
        match current_min {
            Some(min) => self.size_floors.iter().copied().find(|floor| *floor > min),
            None => self.size_floors.iter().copied().find(|floor| *floor > 200),
        }
    }

    /// Largest ceiling strictly below `current_min`, or the default small
    /// business ceiling when no minimum is set
    pub fn next_size_ceiling(&self, current_min: Option<u32>) -> Option<u32> {
        match current_min {
            Some(min) => self
                .size_ceilings
                .iter()
                .copied()
                .filter(|ceiling| *ceiling < min)
                .max(),
            None => self.size_ceilings.iter().copied().find(|c| *c >= 200),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, steps) in [
            ("refinement.size_floors", &self.size_floors),
            ("refinement.size_ceilings", &self.size_ceilings),
        ] {
            if steps.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ConfigError::invalid(field, "Must be strictly ascending"));
            }
        }

        let buckets = [
            ("refinement.size_up", &self.size_up),
            ("refinement.size_down", &self.size_down),
            ("refinement.seniority_up", &self.seniority_up),
            ("refinement.seniority_down", &self.seniority_down),
        ];
        for (field, phrases) in buckets {
            if phrases.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::invalid(field, "Phrases must not be blank"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_size_floor() {
        let vocab = RefinementVocabulary::default();
        assert_eq!(vocab.next_size_floor(None), Some(201));
        assert_eq!(vocab.next_size_floor(Some(50)), Some(51));
        assert_eq!(vocab.next_size_floor(Some(201)), Some(501));
        assert_eq!(vocab.next_size_floor(Some(20_000)), None);
    }

    #[test]
    fn test_next_size_ceiling() {
        let vocab = RefinementVocabulary::default();
        assert_eq!(vocab.next_size_ceiling(None), Some(200));
        assert_eq!(vocab.next_size_ceiling(Some(201)), Some(200));
        assert_eq!(vocab.next_size_ceiling(Some(1000)), Some(500));
        assert_eq!(vocab.next_size_ceiling(Some(5)), None);
    }

    #[test]
    fn test_validate_rejects_unsorted_steps() {
        let mut vocab = RefinementVocabulary::default();
        assert!(vocab.validate().is_ok());
        vocab.size_floors = vec![51, 11];
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_phrase() {
        let mut vocab = RefinementVocabulary::default();
        vocab.size_up.push("  ".into());
        assert!(vocab.validate().is_err());
    }
}
