use std::process::ExitCode;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod runner;

use shared_models::LoadTestError;

/// Exit status when the run completed but at least one threshold failed.
const THRESHOLDS_FAILED: u8 = 99;

#[tokio::main]
async fn main() -> ExitCode {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,load_test=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting telemedicine platform load test");

    match runner::execute().await {
        Ok(true) => {
            info!("All thresholds passed");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            error!("One or more thresholds failed");
            ExitCode::from(THRESHOLDS_FAILED)
        }
        Err(e) => {
            error!("Load test aborted: {:#}", e);
            let code = e
                .downcast_ref::<LoadTestError>()
                .map_or(1, LoadTestError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
