use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use goose::metrics::GooseMetrics;
use goose::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use fixture_cell::FixtureSet;
use journey_cell::{journey_scenario, warm_up, JourneyContext};
use metrics_cell::{evaluate_thresholds, MetricsCollector, RequestTotals};
use report_cell::{prepare_results_dir, text_summary, write_json};
use shared_config::LoadTestConfig;
use shared_models::LoadTestError;

/// Full run: setup, staged goose attack, threshold evaluation and reports.
/// Returns whether every threshold passed.
pub async fn execute() -> Result<bool> {
    let config = Arc::new(LoadTestConfig::from_env()?);
    let profile = config.profile;

    info!(
        "Profile '{}' against {}: up to {} users over {:?}",
        profile.name(),
        config.base_url,
        profile.peak_vus(),
        profile.total_duration()
    );
    warn!(
        "Every admin iteration logs in as {}; admin traffic comes from a single account",
        config.admin_email
    );

    let fixtures = FixtureSet::generate(
        config.patient_count,
        config.healthcare_count,
        &mut StdRng::from_entropy(),
    )
    .shared();

    let collector = Arc::new(MetricsCollector::new()?);
    let ctx = Arc::new(JourneyContext::new(config.clone(), fixtures, collector.clone())?);

    warm_up(&ctx.client).await?;

    let report_file = prepare_results_dir(&config.results_dir)?;
    let metrics = run_attack(&config, ctx, &report_file)
        .await
        .map_err(|e| LoadTestError::Attack(e.to_string()))?;

    let requests = RequestTotals::from_goose(&metrics)?;
    let mut snapshot = collector.snapshot(&requests).await;

    let passed = evaluate_thresholds(&mut snapshot, &profile.thresholds())?;

    write_json(&snapshot, &config.results_dir)?;
    info!("Goose report written to {}", report_file.display());

    println!("{}", text_summary(&snapshot));

    Ok(passed)
}

/// Hands the staged profile to goose as a test plan and runs the single
/// journey scenario until the plan is done.
async fn run_attack(
    config: &LoadTestConfig,
    ctx: Arc<JourneyContext>,
    report_file: &Path,
) -> Result<GooseMetrics, GooseError> {
    let test_plan = config.profile.test_plan(config.graceful_stop);
    let report_file = report_file.to_string_lossy().into_owned();
    info!("Goose test plan: {}", test_plan);

    GooseAttack::initialize()?
        .register_scenario(journey_scenario(ctx)?)
        .set_default(GooseDefault::Host, config.base_url.as_str())?
        .set_default(GooseDefault::TestPlan, test_plan.as_str())?
        .set_default(GooseDefault::ReportFile, report_file.as_str())?
        .set_default(GooseDefault::NoResetMetrics, true)?
        .execute()
        .await
}
