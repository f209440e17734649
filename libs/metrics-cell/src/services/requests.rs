use std::time::Duration;

use goose::metrics::GooseMetrics;
use hdrhistogram::Histogram;
use tracing::debug;

use shared_models::LoadTestError;

use super::latency::{as_micros, latency_histogram};

/// Request-level totals for the whole run, read back from goose once the
/// attack has finished.
#[derive(Debug, Clone)]
pub struct RequestTotals {
    pub http_reqs: u64,
    pub failed: u64,
    /// Goose response times, in microseconds.
    pub durations: Histogram<u64>,
    pub duration_secs: f64,
    pub vus_max: u32,
}

impl RequestTotals {
    pub fn new() -> Result<Self, LoadTestError> {
        Ok(Self {
            http_reqs: 0,
            failed: 0,
            durations: latency_histogram()?,
            duration_secs: 0.0,
            vus_max: 0,
        })
    }

    pub fn record(&mut self, response_time: Duration, success: bool) {
        self.http_reqs += 1;
        if !success {
            self.failed += 1;
        }
        self.durations.saturating_record(as_micros(response_time));
    }

    /// Folds every named request goose aggregated into one set of totals.
    /// Success and failure counts already reflect the journeys' own verdicts.
    pub fn from_goose(metrics: &GooseMetrics) -> Result<Self, LoadTestError> {
        let mut totals = Self::new()?;

        for (key, request) in &metrics.requests {
            let success = request.success_count as u64;
            let fail = request.fail_count as u64;
            debug!("{}: {} ok, {} failed", key, success, fail);

            totals.http_reqs += success + fail;
            totals.failed += fail;

            // Goose buckets response times by whole milliseconds.
            for (millis, count) in &request.raw_data.times {
                totals
                    .durations
                    .saturating_record_n(*millis as u64 * 1000, *count as u64);
            }
        }

        totals.duration_secs = metrics.duration as f64;
        totals.vus_max = u32::try_from(metrics.maximum_users).unwrap_or(u32::MAX);

        Ok(totals)
    }
}
