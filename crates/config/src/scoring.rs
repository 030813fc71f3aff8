//! Prospect Scoring Configuration
//!
//! Weights, priority thresholds and the neutral/default values the scorers
//! fall back to when a prospect or ICP has no data for a criterion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::ConfigError;

/// Scoring configuration, loadable from scoring.yaml or the `scoring`
/// section of the main settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Aggregation weights, looked up by component name
    /// (`company_match`, `person_match`, `intent`, `engagement`)
    #[serde(default = "default_weights")]
    pub weights: HashMap<String, f64>,
    #[serde(default)]
    pub thresholds: ScoreThresholds,
    #[serde(default)]
    pub company_components: CompanyComponentWeights,
    #[serde(default)]
    pub person_components: PersonComponentWeights,
    #[serde(default)]
    pub defaults: NeutralDefaults,
    /// Technology → related technologies signalling adoption readiness
    #[serde(default = "default_related_technologies")]
    pub related_technologies: HashMap<String, Vec<String>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            thresholds: ScoreThresholds::default(),
            company_components: CompanyComponentWeights::default(),
            person_components: PersonComponentWeights::default(),
            defaults: NeutralDefaults::default(),
            related_technologies: default_related_technologies(),
        }
    }
}

/// The weight table the scorer ships with. Its keys name ICP concerns rather
/// than components, so component lookups fall back to
/// [`NeutralDefaults::missing_component_weight`].
fn default_weights() -> HashMap<String, f64> {
    [
        ("company_size", 0.2),
        ("industry_match", 0.3),
        ("role_seniority", 0.2),
        ("tech_stack", 0.15),
        ("recent_activity", 0.15),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_related_technologies() -> HashMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 4] = [
        ("kubernetes", &["docker", "containerization", "microservices"]),
        ("react", &["javascript", "nodejs", "frontend"]),
        ("python", &["data science", "machine learning", "backend"]),
        ("aws", &["cloud", "devops", "infrastructure"]),
    ];
    table
        .into_iter()
        .map(|(tech, related)| {
            (
                tech.to_string(),
                related.iter().map(|r| r.to_string()).collect(),
            )
        })
        .collect()
}

impl ScoringConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;

        let config: ScoringConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Weight for a component, falling back when the table has no entry
    pub fn component_weight(&self, component: &str) -> f64 {
        self.weights
            .get(component)
            .copied()
            .unwrap_or(self.defaults.missing_component_weight)
    }

    /// Related technologies for `technology` (case-insensitive)
    pub fn related_technologies(&self, technology: &str) -> &[String] {
        let key = technology.trim().to_lowercase();
        self.related_technologies
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::invalid(
                    format!("scoring.weights.{}", name),
                    format!("Must be a non-negative number, got {}", weight),
                ));
            }
        }

        self.thresholds.validate()?;

        let component_weights = [
            ("company_components.industry", self.company_components.industry),
            ("company_components.size", self.company_components.size),
            ("company_components.tech_stack", self.company_components.tech_stack),
            ("company_components.geography", self.company_components.geography),
            ("person_components.role", self.person_components.role),
            ("person_components.seniority", self.person_components.seniority),
            ("person_components.skills", self.person_components.skills),
            ("person_components.experience", self.person_components.experience),
            ("defaults.missing_component_weight", self.defaults.missing_component_weight),
        ];
        for (field, weight) in component_weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::invalid(
                    format!("scoring.{}", field),
                    format!("Must be a non-negative number, got {}", weight),
                ));
            }
        }

        let neutral_values = [
            ("defaults.company_neutral", self.defaults.company_neutral),
            ("defaults.person_neutral", self.defaults.person_neutral),
            ("defaults.intent_no_signal", self.defaults.intent_no_signal),
            ("defaults.size_no_criterion", self.defaults.size_no_criterion),
        ];
        for (field, value) in neutral_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    format!("scoring.{}", field),
                    format!("Must be between 0.0 and 1.0, got {}", value),
                ));
            }
        }

        Ok(())
    }
}

/// Priority thresholds on the total score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    #[serde(default = "default_minimum_score")]
    pub minimum_score: f64,
    #[serde(default = "default_high_priority")]
    pub high_priority: f64,
}

fn default_minimum_score() -> f64 {
    0.6
}

fn default_high_priority() -> f64 {
    0.8
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            minimum_score: default_minimum_score(),
            high_priority: default_high_priority(),
        }
    }
}

impl ScoreThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("thresholds.minimum_score", self.minimum_score),
            ("thresholds.high_priority", self.high_priority),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    format!("scoring.{}", field),
                    format!("Must be between 0.0 and 1.0, got {}", value),
                ));
            }
        }
        if self.minimum_score > self.high_priority {
            return Err(ConfigError::invalid(
                "scoring.thresholds",
                format!(
                    "minimum_score ({}) must not exceed high_priority ({})",
                    self.minimum_score, self.high_priority
                ),
            ));
        }
        Ok(())
    }
}

/// Weights inside the company-match component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyComponentWeights {
    pub industry: f64,
    pub size: f64,
    pub tech_stack: f64,
    pub geography: f64,
}

impl Default for CompanyComponentWeights {
    fn default() -> Self {
        Self {
            industry: 0.4,
            size: 0.3,
            tech_stack: 0.2,
            geography: 0.1,
        }
    }
}

/// Weights inside the person-match component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonComponentWeights {
    pub role: f64,
    pub seniority: f64,
    pub skills: f64,
    pub experience: f64,
}

impl Default for PersonComponentWeights {
    fn default() -> Self {
        Self {
            role: 0.4,
            seniority: 0.3,
            skills: 0.2,
            experience: 0.1,
        }
    }
}

/// Fallback values used when nothing can be compared.
///
/// `intent_no_signal` is deliberately below the other neutrals (0.3 vs 0.5);
/// it is kept tunable rather than baked into the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralDefaults {
    pub company_neutral: f64,
    pub person_neutral: f64,
    pub intent_no_signal: f64,
    pub size_no_criterion: f64,
    pub missing_component_weight: f64,
}

impl Default for NeutralDefaults {
    fn default() -> Self {
        Self {
            company_neutral: 0.5,
            person_neutral: 0.5,
            intent_no_signal: 0.3,
            size_no_criterion: 0.5,
            missing_component_weight: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weights.len(), 5);
        assert_eq!(config.defaults.intent_no_signal, 0.3);
    }

    #[test]
    fn test_component_weight_fallback() {
        let mut config = ScoringConfig::default();
        // default table has no component-level keys
        assert_eq!(config.component_weight("company_match"), 0.25);

        config.weights.insert("company_match".into(), 0.7);
        assert_eq!(config.component_weight("company_match"), 0.7);
    }

    #[test]
    fn test_related_technologies_case_insensitive() {
        let config = ScoringConfig::default();
        assert!(config
            .related_technologies("Kubernetes")
            .contains(&"docker".to_string()));
        assert!(config.related_technologies("cobol").is_empty());
    }

    #[test]
    fn test_threshold_validation() {
        let mut config = ScoringConfig::default();
        config.thresholds.minimum_score = 0.9;
        assert!(config.validate().is_err());

        config.thresholds.minimum_score = 0.5;
        config.thresholds.high_priority = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = ScoringConfig::default();
        config.weights.insert("intent".into(), -0.1);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scoring.weights.intent"));
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "weights:\n  company_match: 0.4\n  person_match: 0.3\nthresholds:\n  minimum_score: 0.5\n  high_priority: 0.75\ndefaults:\n  company_neutral: 0.5\n  person_neutral: 0.5\n  intent_no_signal: 0.4\n  size_no_criterion: 0.5\n  missing_component_weight: 0.15"
        )
        .unwrap();

        let config = ScoringConfig::load(file.path()).unwrap();
        assert_eq!(config.component_weight("company_match"), 0.4);
        assert_eq!(config.component_weight("engagement"), 0.15);
        assert_eq!(config.thresholds.high_priority, 0.75);
        assert_eq!(config.defaults.intent_no_signal, 0.4);
        // untouched sections keep defaults
        assert_eq!(config.company_components.industry, 0.4);
        assert!(!config.related_technologies.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ScoringConfig::load("/nonexistent/scoring.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
