use std::time::Duration;

use hdrhistogram::Histogram;

use shared_models::LoadTestError;

pub const SIGNIFICANT_FIGURES: u8 = 3;

/// One hour, in microseconds. Slower samples saturate at this value.
pub const MAX_TRACKED_MICROS: u64 = 3_600_000_000;

/// Fixed-size latency histogram in microseconds. Memory does not grow with
/// the number of samples.
pub fn latency_histogram() -> Result<Histogram<u64>, LoadTestError> {
    Histogram::new_with_bounds(1, MAX_TRACKED_MICROS, SIGNIFICANT_FIGURES)
        .map_err(|e| LoadTestError::Metrics(format!("cannot create latency histogram: {:?}", e)))
}

pub fn as_micros(latency: Duration) -> u64 {
    u64::try_from(latency.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_samples_saturate() {
        let mut histogram = latency_histogram().unwrap();

        histogram.saturating_record(as_micros(Duration::from_secs(2 * 60 * 60)));

        assert_eq!(histogram.len(), 1);
        assert!(histogram.max() >= MAX_TRACKED_MICROS / 1000 * 999);
        assert!(histogram.max() <= MAX_TRACKED_MICROS / 1000 * 1001);
    }

    #[test]
    fn test_micros_conversion() {
        assert_eq!(as_micros(Duration::from_millis(12)), 12_000);
        assert_eq!(as_micros(Duration::ZERO), 0);
    }
}
