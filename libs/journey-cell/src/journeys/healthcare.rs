use chrono::Utc;
use goose::goose::GooseUser;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use tracing::{debug, instrument, warn};

use shared_config::with_id;
use shared_models::{Role, SessionState};

use crate::context::JourneyContext;
use crate::journeys::JourneyTrace;
use crate::plan::HealthcarePlan;
use crate::steps::{self, record_step, StepKind, StepOutcome};

const MEDICATIONS: &[(&str, &str)] = &[
    ("Paracetamol", "500mg"),
    ("Amoxicillin", "500mg"),
    ("Cetirizine", "10mg"),
    ("Omeprazole", "20mg"),
    ("Ibuprofen", "400mg"),
];

/// Healthcare iteration: log in, check the schedule, maybe take a
/// consultation through to a prescription, tweak availability, look up a
/// patient, and log out.
#[instrument(skip_all, fields(role = "healthcare"))]
pub async fn run_healthcare_journey<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &mut SessionState,
    rng: &mut R,
) -> JourneyTrace
where
    R: Rng + Send + ?Sized,
{
    let plan = HealthcarePlan::sample(rng, ctx.config.consultation_pause);
    let mut trace = JourneyTrace::new(Role::Healthcare);

    let Some(professional) = ctx.fixtures.random_healthcare(rng) else {
        warn!("No healthcare fixtures available, skipping iteration");
        return trace;
    };
    trace.push(&steps::login(ctx, user, session, &professional.email, &professional.password).await);

    if !session.is_authenticated() {
        return trace;
    }
    trace.authenticated = true;

    trace.push(&view_schedule(ctx, user, session).await);

    if plan.accept_consultation {
        trace.push(&accept_consultation(ctx, user, session, plan.consultation_id).await);

        debug!("Consulting for {:?}", plan.consultation_pause);
        tokio::time::sleep(plan.consultation_pause).await;

        trace.push(&end_consultation(ctx, user, session, plan.consultation_id).await);

        if plan.prescribe {
            trace.push(&write_prescription(ctx, user, session, plan.consultation_id, rng).await);
        }
    }

    if plan.update_availability {
        trace.push(&update_availability(ctx, user, session, rng).await);
    }

    if plan.view_patient_history {
        trace.push(&view_patient_history(ctx, user, session, plan.patient_id).await);
    }

    trace.push(&steps::logout(ctx, user, session).await);

    trace
}

pub async fn view_schedule(ctx: &JourneyContext, user: &mut GooseUser, session: &SessionState) -> StepOutcome {
    let query = [("date", Utc::now().format("%Y-%m-%d").to_string())];

    let response = ctx
        .client
        .get(
            user,
            StepKind::ViewSchedule.label(),
            &ctx.config.endpoints.healthcare.availability,
            session.bearer(),
            &query,
        )
        .await;

    record_step(ctx, user, StepKind::ViewSchedule, response, None).await
}

pub async fn accept_consultation(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    consultation_id: u64,
) -> StepOutcome {
    let path = with_id(&ctx.config.endpoints.consultations.join, consultation_id);
    let response = ctx
        .client
        .post(user, StepKind::AcceptConsultation.label(), &path, session.bearer(), json!({}))
        .await;

    record_step(ctx, user, StepKind::AcceptConsultation, response, None).await
}

pub async fn end_consultation(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    consultation_id: u64,
) -> StepOutcome {
    let path = with_id(&ctx.config.endpoints.consultations.end, consultation_id);
    let body = json!({
        "notes": "Consultation completed by load test",
        "diagnosis": "Observation",
    });

    let response = ctx
        .client
        .post(user, StepKind::EndConsultation.label(), &path, session.bearer(), body)
        .await;

    record_step(ctx, user, StepKind::EndConsultation, response, None).await
}

pub async fn write_prescription<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    consultation_id: u64,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let count = rng.gen_range(1..=3);
    let medications: Vec<_> = MEDICATIONS
        .choose_multiple(rng, count)
        .map(|(name, dosage)| {
            json!({
                "name": name,
                "dosage": dosage,
                "frequency": "3x daily",
                "duration": "5 days",
            })
        })
        .collect();

    let body = json!({
        "consultationId": consultation_id,
        "medications": medications,
        "notes": "Take after meals",
    });

    let response = ctx
        .client
        .post(
            user,
            StepKind::WritePrescription.label(),
            &ctx.config.endpoints.prescriptions.create,
            session.bearer(),
            body,
        )
        .await;

    record_step(ctx, user, StepKind::WritePrescription, response, None).await
}

pub async fn update_availability<R>(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    rng: &mut R,
) -> StepOutcome
where
    R: Rng + Send + ?Sized,
{
    let start_hour: u32 = rng.gen_range(7..=10);
    let end_hour = start_hour + rng.gen_range(4..=8);

    let body = json!({
        "schedule": [{
            "dayOfWeek": rng.gen_range(0..7),
            "startTime": format!("{:02}:00", start_hour),
            "endTime": format!("{:02}:00", end_hour),
            "available": true,
        }],
    });

    let response = ctx
        .client
        .put(
            user,
            StepKind::UpdateAvailability.label(),
            &ctx.config.endpoints.healthcare.availability,
            session.bearer(),
            body,
        )
        .await;

    record_step(ctx, user, StepKind::UpdateAvailability, response, None).await
}

/// Patient ids here are random, not tied to any booking made in this run.
/// The path is fixed; the endpoint table has no entry for it.
pub async fn view_patient_history(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &SessionState,
    patient_id: u64,
) -> StepOutcome {
    let path = format!("/patients/{}/history", patient_id);
    let response = ctx
        .client
        .get(user, StepKind::ViewPatientHistory.label(), &path, session.bearer(), &[])
        .await;

    record_step(ctx, user, StepKind::ViewPatientHistory, response, None).await
}
