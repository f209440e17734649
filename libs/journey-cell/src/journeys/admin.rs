use goose::goose::GooseUser;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use tracing::instrument;

use shared_config::with_id;
use shared_models::{Role, SessionState};

use crate::context::JourneyContext;
use crate::journeys::JourneyTrace;
use crate::plan::AdminPlan;
use crate::steps::{self, record_step, StepKind, StepOutcome};

const USER_ROLE_FILTERS: &[&str] = &["patient", "healthcare"];
const REPORT_TYPES: &[&str] = &["consultations", "revenue", "users"];
const REPORT_PERIODS: &[&str] = &["daily", "weekly", "monthly"];

/// Admin iteration. Every admin iteration logs in with the same configured
/// account.
#[instrument(skip_all, fields(role = "admin"))]
pub async fn run_admin_journey<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &mut SessionState,
    rng: &mut R,
) -> JourneyTrace
where
    R: Rng + Send + ?Sized,
{
    let plan = AdminPlan::sample(rng);
    let mut trace = JourneyTrace::new(Role::Admin);

    let config = &ctx.config;
    trace.push(&steps::login(ctx, user, session, &config.admin_email, &config.admin_password).await);

    if !session.is_authenticated() {
        return trace;
    }
    trace.authenticated = true;

    trace.push(&view_dashboard(ctx, user, session).await);

    if plan.verify_healthcare {
        trace.push(&verify_healthcare(ctx, user, session, plan.healthcare_id).await);
    }

    if plan.manage_users {
        trace.push(&manage_users(ctx, user, session, rng).await);
    }

    if plan.view_reports {
        trace.push(&view_reports(ctx, user, session, rng).await);
    }

    if plan.system_health {
        trace.push(&system_health(ctx, user, session).await);
    }

    trace.push(&steps::logout(ctx, user, session).await);

    trace
}

pub async fn view_dashboard(ctx: &JourneyContext, user: &mut GooseUser, session: &SessionState) -> StepOutcome {
    let response = ctx
        .client
        .get(
            user,
            StepKind::ViewDashboard.label(),
            &ctx.config.endpoints.admin.dashboard,
            session.bearer(),
            &[],
        )
        .await;

    record_step(ctx, user, StepKind::ViewDashboard, response, None).await
}

pub async fn verify_healthcare(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    healthcare_id: u64,
) -> StepOutcome {
    let path = with_id(&ctx.config.endpoints.healthcare.verification, healthcare_id);
    let body = json!({
        "status": "verified",
        "notes": "Documents verified by load test",
    });

    let response = ctx
        .client
        .put(user, StepKind::VerifyHealthcare.label(), &path, session.bearer(), body)
        .await;

    record_step(ctx, user, StepKind::VerifyHealthcare, response, None).await
}

pub async fn manage_users<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let query = [
        ("page", rng.gen_range(1..=5).to_string()),
        ("limit", "20".to_string()),
        ("role", USER_ROLE_FILTERS.choose(rng).copied().unwrap_or("patient").to_string()),
    ];

    let response = ctx
        .client
        .get(
            user,
            StepKind::ManageUsers.label(),
            &ctx.config.endpoints.admin.users,
            session.bearer(),
            &query,
        )
        .await;

    record_step(ctx, user, StepKind::ManageUsers, response, None).await
}

pub async fn view_reports<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let query = [
        ("type", REPORT_TYPES.choose(rng).copied().unwrap_or("consultations").to_string()),
        ("period", REPORT_PERIODS.choose(rng).copied().unwrap_or("weekly").to_string()),
    ];

    let response = ctx
        .client
        .get(
            user,
            StepKind::ViewReports.label(),
            &ctx.config.endpoints.admin.reports,
            session.bearer(),
            &query,
        )
        .await;

    record_step(ctx, user, StepKind::ViewReports, response, None).await
}

pub async fn system_health(ctx: &JourneyContext, user: &mut GooseUser, session: &SessionState) -> StepOutcome {
    let response = ctx
        .client
        .get(user, StepKind::SystemHealth.label(), "/system/health", session.bearer(), &[])
        .await;

    record_step(ctx, user, StepKind::SystemHealth, response, None).await
}
