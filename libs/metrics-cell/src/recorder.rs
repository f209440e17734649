use std::time::Duration;

use async_trait::async_trait;

use crate::models::Channel;

/// Write-only sink for what goose does not track itself: step latency,
/// journey outcome rates, named checks and iterations. Implementations must
/// be safe to share between every goose user of a run.
#[async_trait]
pub trait MetricsRecorder: Send + Sync {
    /// Adds one step latency to `api_latency`.
    async fn record_latency(&self, latency: Duration);

    /// Appends one outcome to a rate channel.
    async fn record_boolean(&self, channel: Channel, outcome: bool);

    /// Tallies one named check.
    async fn record_check(&self, name: &str, passed: bool);

    /// Counts one finished journey iteration.
    async fn record_iteration(&self);
}
