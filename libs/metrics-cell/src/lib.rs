// =====================================================================================
// METRICS CELL - JOURNEY METRICS & THRESHOLDS
// =====================================================================================
//
// Goose owns request counting and response times. Journeys add what goose
// cannot know (step latency, outcome rates, named checks) through the
// `MetricsRecorder` trait. After the run the collector folds both into a
// `MetricsSnapshot`, and thresholds are evaluated against that snapshot.
//
// =====================================================================================

pub mod models;
pub mod recorder;
pub mod services;

pub use models::{
    Channel, ChannelKind, CheckStats, MetricsSnapshot, RateStats, ThresholdResult, TrendStats,
};
pub use recorder::MetricsRecorder;
pub use services::{
    as_micros, evaluate_thresholds, latency_histogram, MetricsCollector, RequestTotals, Threshold,
};
