use tracing::{info, instrument};

use shared_client::ApiClient;
use shared_models::LoadTestError;

pub const HEALTH_PATH: &str = "/health";

/// Setup-phase probe. Not recorded as a step; any non-200 answer aborts the
/// run before a single virtual user starts.
#[instrument(skip_all, fields(base_url = %client.base_url()))]
pub async fn warm_up(client: &ApiClient) -> Result<(), LoadTestError> {
    let response = client.probe(HEALTH_PATH).await;

    match response.status {
        Some(200) => {
            info!("Target is healthy ({:.0}ms)", response.latency_ms());
            Ok(())
        }
        Some(status) => Err(LoadTestError::WarmUp(format!(
            "{}{} answered {}",
            client.base_url(),
            HEALTH_PATH,
            status
        ))),
        None => Err(LoadTestError::WarmUp(format!(
            "{}{} unreachable: {}",
            client.base_url(),
            HEALTH_PATH,
            response.error.unwrap_or_default()
        ))),
    }
}
