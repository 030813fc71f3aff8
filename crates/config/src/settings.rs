//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ConfigError, RefinementVocabulary, ScoringConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Staging and production refuse settings that development only warns about
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Scoring weights, thresholds and neutral defaults
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    /// Batch scoring concurrency
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Keyword buckets used to turn free-text feedback into ICP edits
    #[serde(default)]
    pub refinement: RefinementVocabulary,
}

/// Defaults applied when a rank request leaves options unset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub default_min_score: f64,
    #[serde(default)]
    pub default_limit: Option<usize>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_min_score: 0.0,
            default_limit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Scoring chunks in flight at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Prospects scored per blocking task
    #[serde(default = "default_batch_chunk_size")]
    pub batch_chunk_size: usize,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_batch_chunk_size() -> usize {
    16
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            batch_chunk_size: default_batch_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.validate_ranking()?;
        self.validate_pipeline()?;
        self.refinement.validate()?;
        Ok(())
    }

    fn validate_ranking(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.ranking.default_min_score) {
            return Err(ConfigError::invalid(
                "ranking.default_min_score",
                format!(
                    "Must be between 0.0 and 1.0, got {}",
                    self.ranking.default_min_score
                ),
            ));
        }

        if self.ranking.default_limit == Some(0) {
            if self.environment.is_strict() {
                return Err(ConfigError::invalid(
                    "ranking.default_limit",
                    "A limit of 0 would return no prospects",
                ));
            }
            tracing::warn!("ranking.default_limit is 0; every rank request will be empty");
        }

        Ok(())
    }

    fn validate_pipeline(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_concurrency == 0 {
            return Err(ConfigError::invalid(
                "pipeline.max_concurrency",
                "Must be at least 1",
            ));
        }

        if self.pipeline.batch_chunk_size == 0 {
            return Err(ConfigError::invalid(
                "pipeline.batch_chunk_size",
                "Must be at least 1",
            ));
        }

        Ok(())
    }

    /// JSON logs are forced on in production
    pub fn wants_json_logs(&self) -> bool {
        self.observability.log_json || self.environment.is_production()
    }
}

/// Load settings from `config/` in the working directory plus environment
/// variables
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from `{dir}/default.*`, then `{dir}/{env}.*`, then
/// `LEADGEN__*` environment variables
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::from(dir.join("default")).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("LEADGEN")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        max_concurrency = settings.pipeline.max_concurrency,
        "Settings loaded"
    );

    Ok(settings)
}
