// =====================================================================================
// METRICS CELL MODELS
// =====================================================================================

use std::collections::BTreeMap;
use std::fmt;

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Latency of every journey step, in milliseconds.
    ApiLatency,
    /// Goose's response times for the same requests.
    HttpReqDuration,
    LoginSuccess,
    ConsultationSuccess,
    PaymentSuccess,
    /// Transport error or status >= 400 on any request.
    HttpReqFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChannelKind {
    Trend,
    Rate,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::ApiLatency,
        Channel::HttpReqDuration,
        Channel::LoginSuccess,
        Channel::ConsultationSuccess,
        Channel::PaymentSuccess,
        Channel::HttpReqFailed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::ApiLatency => "api_latency",
            Channel::HttpReqDuration => "http_req_duration",
            Channel::LoginSuccess => "login_success",
            Channel::ConsultationSuccess => "consultation_success",
            Channel::PaymentSuccess => "payment_success",
            Channel::HttpReqFailed => "http_req_failed",
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            Channel::ApiLatency | Channel::HttpReqDuration => ChannelKind::Trend,
            _ => ChannelKind::Rate,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Histograms hold microseconds; everything reported is milliseconds.
pub(crate) fn to_ms(micros: u64) -> f64 {
    micros as f64 / 1000.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    pub count: u64,
    pub avg: f64,
    pub min: f64,
    pub med: f64,
    pub max: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl TrendStats {
    pub fn from_histogram(histogram: &Histogram<u64>) -> Self {
        if histogram.len() == 0 {
            return Self::default();
        }

        Self {
            count: histogram.len(),
            avg: histogram.mean() / 1000.0,
            min: to_ms(histogram.min()),
            med: to_ms(histogram.value_at_quantile(0.50)),
            max: to_ms(histogram.max()),
            p90: to_ms(histogram.value_at_quantile(0.90)),
            p95: to_ms(histogram.value_at_quantile(0.95)),
            p99: to_ms(histogram.value_at_quantile(0.99)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateStats {
    pub passes: u64,
    pub fails: u64,
    pub rate: f64,
}

impl RateStats {
    pub fn new(passes: u64, fails: u64) -> Self {
        let total = passes + fails;
        Self {
            passes,
            fails,
            rate: if total > 0 { passes as f64 / total as f64 } else { 0.0 },
        }
    }

    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckStats {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckStats {
    pub fn pass_rate(&self) -> f64 {
        let total = self.passes + self.fails;
        if total == 0 {
            0.0
        } else {
            self.passes as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    pub metric: String,
    pub expression: String,
    /// `None` when the metric received no samples during the run.
    pub observed: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub duration_secs: f64,
    pub iterations: u64,
    pub vus_max: u32,
    pub http_reqs: u64,
    pub trends: BTreeMap<String, TrendStats>,
    pub rates: BTreeMap<String, RateStats>,
    pub checks: Vec<CheckStats>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdResult>,
    /// Full distributions behind `trends`, kept for threshold evaluation.
    #[serde(skip)]
    pub histograms: BTreeMap<String, Histogram<u64>>,
}

impl MetricsSnapshot {
    pub fn trend(&self, channel: Channel) -> Option<&TrendStats> {
        self.trends.get(channel.name())
    }

    pub fn histogram(&self, channel: Channel) -> Option<&Histogram<u64>> {
        self.histograms.get(channel.name())
    }

    pub fn rate(&self, channel: Channel) -> Option<&RateStats> {
        self.rates.get(channel.name())
    }

    pub fn checks_passed(&self) -> u64 {
        self.checks.iter().map(|c| c.passes).sum()
    }

    pub fn checks_failed(&self) -> u64 {
        self.checks.iter().map(|c| c.fails).sum()
    }

    pub fn thresholds_passed(&self) -> bool {
        self.thresholds.iter().all(|t| t.passed)
    }

    pub fn requests_per_second(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.http_reqs as f64 / self.duration_secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::latency::latency_histogram;

    fn histogram_of(millis: impl IntoIterator<Item = u64>) -> Histogram<u64> {
        let mut histogram = latency_histogram().unwrap();
        for ms in millis {
            histogram.saturating_record(ms * 1000);
        }
        histogram
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= expected * 0.001 + 0.001
    }

    #[test]
    fn test_trend_stats_percentiles() {
        let stats = TrendStats::from_histogram(&histogram_of(1..=100));

        assert_eq!(stats.count, 100);
        assert!(close(stats.min, 1.0), "min {}", stats.min);
        assert!(close(stats.max, 100.0), "max {}", stats.max);
        assert!(close(stats.avg, 50.5), "avg {}", stats.avg);
        assert!(close(stats.p95, 95.0), "p95 {}", stats.p95);
        assert!(close(stats.p99, 99.0), "p99 {}", stats.p99);
    }

    #[test]
    fn test_trend_stats_unsorted_input() {
        let stats = TrendStats::from_histogram(&histogram_of([300, 100, 200]));
        assert!(close(stats.min, 100.0));
        assert!(close(stats.med, 200.0));
        assert!(close(stats.max, 300.0));
    }

    #[test]
    fn test_empty_trend_is_zeroed() {
        assert_eq!(TrendStats::from_histogram(&histogram_of([])), TrendStats::default());
    }

    #[test]
    fn test_rate_stats() {
        let rate = RateStats::new(3, 1);
        assert_eq!(rate.total(), 4);
        assert!((rate.rate - 0.75).abs() < f64::EPSILON);
        assert_eq!(RateStats::new(0, 0).rate, 0.0);
    }

    #[test]
    fn test_channel_names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_name(channel.name()), Some(channel));
        }
        assert_eq!(Channel::from_name("nope"), None);
        assert_eq!(Channel::ApiLatency.kind(), ChannelKind::Trend);
        assert_eq!(Channel::HttpReqDuration.kind(), ChannelKind::Trend);
        assert_eq!(Channel::PaymentSuccess.kind(), ChannelKind::Rate);
    }
}
