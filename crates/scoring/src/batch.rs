//! Concurrent batch scoring
//!
//! Scoring is CPU-bound and independent per prospect, so a batch is split
//! into chunks that run on the blocking pool. A semaphore bounds how many
//! chunks are in flight; results are collected in input order.

use std::sync::Arc;

use futures::future::try_join_all;
use leadgen_core::{Error, Icp, Prospect, ScoringStrategy};
use tokio::sync::Semaphore;

use crate::ScoringError;

/// Concurrency limits for [`score_batch`]
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub max_concurrency: usize,
    pub chunk_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            chunk_size: 16,
        }
    }
}

/// Result of scoring a batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Prospects carrying their new score, in input order
    pub scored: Vec<Prospect>,
    /// Prospects that could not be scored at all, by id
    pub failed: Vec<(String, Error)>,
}

fn into_chunks(prospects: Vec<Prospect>, chunk_size: usize) -> Vec<Vec<Prospect>> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(prospects.len() / chunk_size + 1);
    let mut iter = prospects.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(chunk_size).collect());
    }
    chunks
}

/// Score every prospect against one ICP snapshot.
///
/// Per-prospect failures (blank ids) are reported in
/// [`BatchOutcome::failed`] and do not abort the batch; only a worker-pool
/// failure returns an error.
pub async fn score_batch(
    strategy: Arc<dyn ScoringStrategy>,
    prospects: Vec<Prospect>,
    icp: Arc<Icp>,
    options: BatchOptions,
) -> Result<BatchOutcome, ScoringError> {
    let total = prospects.len();
    if total == 0 {
        return Ok(BatchOutcome::default());
    }

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let tasks = into_chunks(prospects, options.chunk_size)
        .into_iter()
        .map(|chunk| {
            let semaphore = Arc::clone(&semaphore);
            let strategy = Arc::clone(&strategy);
            let icp = Arc::clone(&icp);
            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ScoringError::PoolClosed)?;

                tokio::task::spawn_blocking(move || {
                    chunk
                        .into_iter()
                        .map(|prospect| {
                            let result = strategy.score(&prospect, &icp);
                            (prospect, result)
                        })
                        .collect::<Vec<_>>()
                })
                .await
                .map_err(|e| ScoringError::Join(e.to_string()))
            }
        });

    let chunks = try_join_all(tasks).await?;

    let mut outcome = BatchOutcome {
        scored: Vec::with_capacity(total),
        failed: Vec::new(),
    };
    for (prospect, result) in chunks.into_iter().flatten() {
        match result {
            Ok(score) => outcome.scored.push(prospect.with_score(Arc::new(score))),
            Err(e) => {
                tracing::warn!(prospect_id = %prospect.id, error = %e, "Prospect could not be scored");
                outcome.failed.push((prospect.id, e));
            }
        }
    }

    tracing::info!(
        icp_id = %icp.id,
        icp_version = icp.version,
        strategy = strategy.name(),
        total,
        scored = outcome.scored.len(),
        failed = outcome.failed.len(),
        "Batch scored"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgen_core::{Company, Person};

    fn prospects(n: usize) -> Vec<Prospect> {
        (0..n)
            .map(|i| {
                Prospect::new(
                    format!("p{}", i),
                    Company::named(format!("Company {}", i)),
                    Person::default(),
                    "test",
                )
            })
            .collect()
    }

    #[test]
    fn test_chunks_preserve_order() {
        let chunks = into_chunks(prospects(7), 3);
        assert_eq!(chunks.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 3, 1]);
        assert_eq!(chunks[2][0].id, "p6");

        assert_eq!(into_chunks(prospects(2), 0).len(), 2);
    }
}
