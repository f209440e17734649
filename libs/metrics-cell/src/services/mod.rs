pub mod collector;
pub mod latency;
pub mod requests;
pub mod thresholds;

pub use collector::MetricsCollector;
pub use latency::{as_micros, latency_histogram};
pub use requests::RequestTotals;
pub use thresholds::{evaluate_thresholds, Aggregation, Comparison, Threshold};
