use chrono::{Duration as ChronoDuration, Utc};
use goose::goose::GooseUser;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};
use tracing::{instrument, warn};

use fixture_cell::{random_digits, FixtureGenerator, SPECIALIZATIONS};
use shared_models::{Role, SessionState};

use crate::context::JourneyContext;
use crate::journeys::JourneyTrace;
use crate::plan::PatientPlan;
use crate::steps::{self, record_step, StepKind, StepOutcome};

const CONSULTATION_TYPES: &[&str] = &["video", "chat", "voice"];
const PAYMENT_METHODS: &[&str] = &["bank_transfer", "e_wallet", "credit_card"];
const COMPLAINTS: &[&str] = &[
    "Persistent headache for three days",
    "Fever and sore throat",
    "Skin rash on both arms",
    "Follow-up on blood pressure medication",
    "Lower back pain after exercise",
];
const CONSULTATION_FEE: u64 = 150_000;

/// Patient iteration: authenticate (register or log in), then search,
/// optionally book and pay, browse history, edit profile, and log out.
#[instrument(skip_all, fields(role = "patient"))]
pub async fn run_patient_journey<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &mut SessionState,
    rng: &mut R,
) -> JourneyTrace
where
    R: Rng + Send + ?Sized,
{
    let plan = PatientPlan::sample(rng);
    let mut trace = JourneyTrace::new(Role::Patient);

    if plan.register {
        let account = FixtureGenerator::registration_patient(rng);
        trace.push(&steps::register(ctx, user, session, &account).await);
    } else {
        let Some(patient) = ctx.fixtures.random_patient(rng) else {
            warn!("No patient fixtures available, skipping iteration");
            return trace;
        };
        trace.push(&steps::login(ctx, user, session, &patient.email, &patient.password).await);
    }

    if !session.is_authenticated() {
        return trace;
    }
    trace.authenticated = true;

    let search = search_healthcare(ctx, user, session, rng).await;
    let provider_ids = provider_ids(&search);
    trace.push(&search);

    if plan.book_consultation {
        let booking = book_consultation(ctx, user, session, &provider_ids, rng).await;
        let consultation_id = booking.response.field("consultationId").cloned();
        trace.push(&booking);

        if plan.pay {
            trace.push(&submit_payment(ctx, user, session, consultation_id, rng).await);
        }
    }

    if plan.view_history {
        trace.push(&view_consultation_history(ctx, user, session, rng).await);
    }

    if plan.update_profile {
        trace.push(&update_profile(ctx, user, session, rng).await);
    }

    trace.push(&steps::logout(ctx, user, session).await);

    trace
}

fn provider_ids(outcome: &StepOutcome) -> Vec<Value> {
    outcome
        .response
        .field("data")
        .and_then(Value::as_array)
        .map(|providers| providers.iter().filter_map(|p| p.get("id").cloned()).collect())
        .unwrap_or_default()
}

pub async fn search_healthcare<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let specialization = SPECIALIZATIONS.choose(rng).copied().unwrap_or("General Practice");
    let query = [
        ("specialization", specialization.to_string()),
        ("available", "true".to_string()),
    ];

    let response = ctx
        .client
        .get(
            user,
            StepKind::SearchHealthcare.label(),
            &ctx.config.endpoints.healthcare.list,
            session.bearer(),
            &query,
        )
        .await;

    let has_results = response
        .field("data")
        .and_then(Value::as_array)
        .is_some_and(|data| !data.is_empty());

    record_step(
        ctx,
        user,
        StepKind::SearchHealthcare,
        response,
        Some(("has results", has_results)),
    )
    .await
}

pub async fn book_consultation<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    provider_ids: &[Value],
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let healthcare_id = provider_ids
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| json!(rng.gen_range(1..=ctx.config.healthcare_count.max(1) as u64)));

    let scheduled_at = Utc::now()
        + ChronoDuration::days(rng.gen_range(1..=7))
        + ChronoDuration::hours(rng.gen_range(0..8));

    let body = json!({
        "healthcareId": healthcare_id,
        "scheduledAt": scheduled_at.to_rfc3339(),
        "type": CONSULTATION_TYPES.choose(rng).copied().unwrap_or("video"),
        "complaint": COMPLAINTS.choose(rng).copied().unwrap_or_default(),
    });

    let response = ctx
        .client
        .post(
            user,
            StepKind::BookConsultation.label(),
            &ctx.config.endpoints.consultations.create,
            session.bearer(),
            body,
        )
        .await;

    let has_id = response.field("consultationId").is_some_and(|id| !id.is_null());

    record_step(
        ctx,
        user,
        StepKind::BookConsultation,
        response,
        Some(("has consultationId", has_id)),
    )
    .await
}

/// A missing `consultation_id` (failed booking) is sent as `null` so the
/// payment request still goes out and fails its check on the server side.
pub async fn submit_payment<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    consultation_id: Option<Value>,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let body = json!({
        "consultationId": consultation_id.unwrap_or(Value::Null),
        "amount": CONSULTATION_FEE,
        "method": PAYMENT_METHODS.choose(rng).copied().unwrap_or("bank_transfer"),
    });

    let response = ctx
        .client
        .post(
            user,
            StepKind::SubmitPayment.label(),
            &ctx.config.endpoints.payments.create,
            session.bearer(),
            body,
        )
        .await;

    let has_url = response
        .field("paymentUrl")
        .and_then(Value::as_str)
        .is_some_and(|url| !url.is_empty());

    record_step(
        ctx,
        user,
        StepKind::SubmitPayment,
        response,
        Some(("has paymentUrl", has_url)),
    )
    .await
}

pub async fn view_consultation_history<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let query = [
        ("limit", "10".to_string()),
        ("page", rng.gen_range(1..=3).to_string()),
    ];

    let response = ctx
        .client
        .get(
            user,
            StepKind::ViewConsultationHistory.label(),
            &ctx.config.endpoints.consultations.history,
            session.bearer(),
            &query,
        )
        .await;

    record_step(ctx, user, StepKind::ViewConsultationHistory, response, None).await
}

pub async fn update_profile<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let body = json!({
        "phone": format!("08{}", random_digits(10, rng)),
        "address": format!("{} Updated Street, Jakarta", rng.gen_range(1..=999)),
    });

    let response = ctx
        .client
        .put(
            user,
            StepKind::UpdateProfile.label(),
            &ctx.config.endpoints.users.update,
            session.bearer(),
            body,
        )
        .await;

    record_step(ctx, user, StepKind::UpdateProfile, response, None).await
}
