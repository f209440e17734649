// =====================================================================================
// METRICS COLLECTOR SERVICE
// =====================================================================================

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hdrhistogram::Histogram;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use shared_models::LoadTestError;

use super::latency::{as_micros, latency_histogram};
use super::requests::RequestTotals;
use crate::models::{Channel, ChannelKind, CheckStats, MetricsSnapshot, RateStats, TrendStats};
use crate::recorder::MetricsRecorder;

#[derive(Debug, Default)]
struct RateCounter {
    passes: u64,
    fails: u64,
}

impl RateCounter {
    fn add(&mut self, outcome: bool) {
        if outcome {
            self.passes += 1;
        } else {
            self.fails += 1;
        }
    }
}

#[derive(Debug)]
pub struct MetricsCollector {
    sample_count: AtomicU64,
    iterations: AtomicU64,
    latency: RwLock<Histogram<u64>>,
    rates: RwLock<HashMap<Channel, RateCounter>>,
    checks: RwLock<BTreeMap<String, RateCounter>>,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, LoadTestError> {
        Ok(Self {
            sample_count: AtomicU64::new(0),
            iterations: AtomicU64::new(0),
            latency: RwLock::new(latency_histogram()?),
            rates: RwLock::new(HashMap::new()),
            checks: RwLock::new(BTreeMap::new()),
        })
    }

    /// Total number of latencies and rate outcomes written so far.
    pub fn sample_count(&self) -> u64 {
        self.sample_count.load(Ordering::Relaxed)
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    pub async fn latency_count(&self) -> u64 {
        self.latency.read().await.len()
    }

    /// Number of populated histogram buckets. Bounded by the histogram's
    /// precision, not by how many samples were recorded.
    pub async fn latency_buckets(&self) -> usize {
        self.latency.read().await.iter_recorded().count()
    }

    /// Combines the journey-side channels with goose's request totals.
    pub async fn snapshot(&self, requests: &RequestTotals) -> MetricsSnapshot {
        let mut trends = BTreeMap::new();
        let mut histograms = BTreeMap::new();

        {
            let latency = self.latency.read().await;
            if latency.len() > 0 {
                trends.insert(
                    Channel::ApiLatency.name().to_string(),
                    TrendStats::from_histogram(&latency),
                );
                histograms.insert(Channel::ApiLatency.name().to_string(), (*latency).clone());
            }
        }

        if requests.durations.len() > 0 {
            trends.insert(
                Channel::HttpReqDuration.name().to_string(),
                TrendStats::from_histogram(&requests.durations),
            );
            histograms.insert(
                Channel::HttpReqDuration.name().to_string(),
                requests.durations.clone(),
            );
        }

        let mut rates: BTreeMap<String, RateStats> = {
            let rates = self.rates.read().await;
            rates
                .iter()
                .map(|(channel, counter)| {
                    (channel.name().to_string(), RateStats::new(counter.passes, counter.fails))
                })
                .collect()
        };

        if requests.http_reqs > 0 {
            rates.insert(
                Channel::HttpReqFailed.name().to_string(),
                RateStats::new(requests.failed, requests.http_reqs - requests.failed),
            );
        }

        let checks: Vec<CheckStats> = {
            let checks = self.checks.read().await;
            checks
                .iter()
                .map(|(name, counter)| CheckStats {
                    name: name.clone(),
                    passes: counter.passes,
                    fails: counter.fails,
                })
                .collect()
        };

        debug!(
            "Built metrics snapshot with {} samples and {} requests",
            self.sample_count(),
            requests.http_reqs
        );

        MetricsSnapshot {
            generated_at: chrono::Utc::now(),
            duration_secs: requests.duration_secs,
            iterations: self.iterations(),
            vus_max: requests.vus_max,
            http_reqs: requests.http_reqs,
            trends,
            rates,
            checks,
            thresholds: Vec::new(),
            histograms,
        }
    }
}

#[async_trait]
impl MetricsRecorder for MetricsCollector {
    #[instrument(skip(self), level = "trace")]
    async fn record_latency(&self, latency: Duration) {
        self.sample_count.fetch_add(1, Ordering::Relaxed);
        self.latency.write().await.saturating_record(as_micros(latency));
    }

    #[instrument(skip(self), level = "trace")]
    async fn record_boolean(&self, channel: Channel, outcome: bool) {
        debug_assert_eq!(channel.kind(), ChannelKind::Rate);
        self.sample_count.fetch_add(1, Ordering::Relaxed);
        self.rates.write().await.entry(channel).or_default().add(outcome);
    }

    async fn record_check(&self, name: &str, passed: bool) {
        self.checks.write().await.entry(name.to_string()).or_default().add(passed);
    }

    async fn record_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
    }
}
