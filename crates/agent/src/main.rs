//! Prospect ranking runner
//!
//! Scores and ranks a candidate file against an ICP file:
//!
//! ```text
//! leadgen-runner <icp.json> <candidates.json> [--min-score 0.6] [--limit 20]
//! ```
//!
//! The candidates file is either an array of `{company, person, source}`
//! records or `{"source": .., "companies": [..], "people": [..]}`.

use std::sync::Arc;

use anyhow::{bail, Context};
use leadgen_agent::{
    pair_companies_and_people, InMemoryProspectStore, ProspectAgent, RankOptions,
};
use leadgen_config::{load_settings, Settings};
use leadgen_core::{Icp, RawCandidate};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateFile {
    Records(Vec<RawCandidate>),
    Split {
        #[serde(default = "default_source")]
        source: String,
        #[serde(default)]
        companies: Vec<serde_json::Value>,
        #[serde(default)]
        people: Vec<serde_json::Value>,
    },
}

fn default_source() -> String {
    "people_search".to_string()
}

impl CandidateFile {
    fn into_candidates(self) -> Vec<RawCandidate> {
        match self {
            CandidateFile::Records(records) => records,
            CandidateFile::Split {
                source,
                companies,
                people,
            } => pair_companies_and_people(&companies, &people, &source),
        }
    }
}

struct Args {
    icp_path: String,
    candidates_path: String,
    min_score: Option<f64>,
    limit: Option<usize>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut min_score = None;
    let mut limit = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--min-score" => {
                let value = args.next().context("--min-score needs a value")?;
                min_score = Some(value.parse().context("--min-score must be a number")?);
            }
            "--limit" => {
                let value = args.next().context("--limit needs a value")?;
                limit = Some(value.parse().context("--limit must be a whole number")?);
            }
            _ => positional.push(arg),
        }
    }

    match <[String; 2]>::try_from(positional) {
        Ok([icp_path, candidates_path]) => Ok(Args {
            icp_path,
            candidates_path,
            min_score,
            limit,
        }),
        Err(_) => bail!(
            "usage: leadgen-runner <icp.json> <candidates.json> [--min-score X] [--limit N]"
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("LEADGEN_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);
    tracing::info!(
        environment = ?settings.environment,
        config_env = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let args = parse_args()?;

    let icp: Icp = serde_json::from_str(
        &tokio::fs::read_to_string(&args.icp_path)
            .await
            .with_context(|| format!("reading ICP file {}", args.icp_path))?,
    )
    .with_context(|| format!("parsing ICP file {}", args.icp_path))?;

    let candidates: CandidateFile = serde_json::from_str(
        &tokio::fs::read_to_string(&args.candidates_path)
            .await
            .with_context(|| format!("reading candidates file {}", args.candidates_path))?,
    )
    .with_context(|| format!("parsing candidates file {}", args.candidates_path))?;

    let mut options = RankOptions::from_config(&settings.ranking);
    if let Some(min_score) = args.min_score {
        options.min_score = min_score;
    }
    if args.limit.is_some() {
        options.limit = args.limit;
    }

    let agent = ProspectAgent::new(&settings, Arc::new(InMemoryProspectStore::new()))?;
    agent.set_icp(icp)?;
    agent.ingest(&candidates.into_candidates())?;

    let scoring = agent.score_active().await?;
    for (id, error) in &scoring.failed {
        tracing::warn!(prospect_id = %id, error = %error, "Skipped prospect");
    }

    let ranked = agent.rank_active(Some(options))?;
    let report = serde_json::json!({
        "ranked": ranked.ranked,
        "total_evaluated": ranked.total_evaluated,
        "total_after_filter": ranked.total_after_filter,
        "insights": agent.insights(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("leadgen={}", level).into()
    });

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.wants_json_logs() {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    subscriber.with(fmt_layer).init();
}
