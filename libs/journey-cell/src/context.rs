use std::sync::Arc;

use fixture_cell::SharedFixtures;
use metrics_cell::MetricsRecorder;
use shared_client::ApiClient;
use shared_config::LoadTestConfig;
use shared_models::LoadTestError;

/// Everything a journey needs that outlives one iteration. Built once and
/// shared by every virtual user.
#[derive(Clone)]
pub struct JourneyContext {
    pub client: ApiClient,
    pub config: Arc<LoadTestConfig>,
    pub fixtures: SharedFixtures,
    pub recorder: Arc<dyn MetricsRecorder>,
}

impl JourneyContext {
    pub fn new(
        config: Arc<LoadTestConfig>,
        fixtures: SharedFixtures,
        recorder: Arc<dyn MetricsRecorder>,
    ) -> Result<Self, LoadTestError> {
        let client = ApiClient::new(&config).map_err(|e| LoadTestError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config,
            fixtures,
            recorder,
        })
    }
}
