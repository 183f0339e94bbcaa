//! Background repopulation of the cache.
//!
//! # Responsibilities
//! - Periodically fetch every tracked key
//! - Assemble the results into one snapshot and publish it
//! - Carry forward recent values for keys that failed, when configured

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::time;

use crate::cache::snapshot::{Entry, Snapshot};
use crate::cache::store::RefreshingCache;
use crate::config::RefreshConfig;
use crate::observability::metrics;

/// Source of fresh entities, called once per tracked key per cycle.
#[async_trait]
pub trait EntityFetcher: Send + Sync + 'static {
    type Entity: Clone + Send + Sync + 'static;
    type Error: fmt::Display + Send;

    async fn fetch(&self, key: &str) -> Result<Self::Entity, Self::Error>;
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Keys fetched successfully this cycle.
    pub fetched: usize,
    /// Keys carried forward from the previous snapshot.
    pub retained: usize,
    /// Keys whose fetch failed or timed out.
    pub failed: Vec<String>,
}

/// Single-writer refresh loop for a `RefreshingCache`.
pub struct Refresher<F: EntityFetcher> {
    cache: Arc<RefreshingCache<F::Entity>>,
    fetcher: Arc<F>,
    keys: Vec<String>,
    interval: Duration,
    fetch_timeout: Duration,
    retention: Option<Duration>,
}

impl<F: EntityFetcher> Refresher<F> {
    pub fn new(cache: Arc<RefreshingCache<F::Entity>>, fetcher: Arc<F>, config: &RefreshConfig) -> Self {
        Self {
            cache,
            fetcher,
            keys: config.symbols.clone(),
            interval: config.interval(),
            fetch_timeout: config.fetch_timeout(),
            retention: config.retention(),
        }
    }

    /// Fetch every key concurrently, publish the result, and report.
    pub async fn refresh_once(&self) -> RefreshReport {
        let started = Instant::now();
        let fetches = self.keys.iter().map(|key| async move {
            let outcome = time::timeout(self.fetch_timeout, self.fetcher.fetch(key)).await;
            (key, outcome)
        });
        let outcomes = join_all(fetches).await;

        let previous = self.cache.snapshot();
        let now = Utc::now();
        let mut report = RefreshReport::default();
        let mut entries = Vec::with_capacity(self.keys.len());

        for (key, outcome) in outcomes {
            match outcome {
                Ok(Ok(value)) => {
                    report.fetched += 1;
                    entries.push((key.clone(), Entry::new(value, now)));
                    continue;
                }
                Ok(Err(e)) => {
                    tracing::warn!(key = %key, error = %e, "Refresh fetch failed");
                }
                Err(_) => {
                    tracing::warn!(
                        key = %key,
                        timeout_secs = self.fetch_timeout.as_secs(),
                        "Refresh fetch timed out"
                    );
                }
            }
            report.failed.push(key.clone());

            let Some(max_age) = self.retention else {
                continue;
            };
            if let Some(old) = previous.get(key) {
                let fresh_enough = (now - old.fetched_at)
                    .to_std()
                    .map(|age| age <= max_age)
                    .unwrap_or(true);
                if fresh_enough {
                    report.retained += 1;
                    entries.push((key.clone(), old.clone()));
                } else {
                    tracing::info!(key = %key, "Dropping stale value after repeated failures");
                }
            }
        }

        self.cache.publish(Snapshot::from_entries(entries));

        let elapsed = started.elapsed();
        metrics::record_refresh(report.fetched, report.failed.len(), report.retained, elapsed);
        tracing::info!(
            fetched = report.fetched,
            retained = report.retained,
            failed = report.failed.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Cache refreshed"
        );
        report
    }

    /// Refresh immediately, then every `interval` after each cycle ends,
    /// until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            keys = self.keys.len(),
            "Cache refresher starting"
        );

        loop {
            tokio::select! {
                _ = self.refresh_once() => {}
                _ = shutdown.recv() => break,
            }
            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!("Cache refresher received shutdown signal, exiting loop");
    }
}
