use std::time::Duration;

use serde_json::json;
use tracing::{debug, instrument, warn};

use goose::goose::GooseUser;

use metrics_cell::Channel;
use shared_client::StepResponse;
use shared_models::{AuthResponse, SessionState, SyntheticUser};

use crate::context::JourneyContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Register,
    Login,
    Logout,
    SearchHealthcare,
    BookConsultation,
    SubmitPayment,
    ViewConsultationHistory,
    UpdateProfile,
    ViewSchedule,
    AcceptConsultation,
    EndConsultation,
    WritePrescription,
    UpdateAvailability,
    ViewPatientHistory,
    ViewDashboard,
    VerifyHealthcare,
    ManageUsers,
    ViewReports,
    SystemHealth,
}

/// Pass criteria for one step: exact status code and a latency ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCheck {
    pub expected_status: u16,
    pub max_latency: Duration,
}

impl StepKind {
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Register => "register",
            StepKind::Login => "login",
            StepKind::Logout => "logout",
            StepKind::SearchHealthcare => "search healthcare",
            StepKind::BookConsultation => "book consultation",
            StepKind::SubmitPayment => "submit payment",
            StepKind::ViewConsultationHistory => "consultation history",
            StepKind::UpdateProfile => "update profile",
            StepKind::ViewSchedule => "view schedule",
            StepKind::AcceptConsultation => "accept consultation",
            StepKind::EndConsultation => "end consultation",
            StepKind::WritePrescription => "write prescription",
            StepKind::UpdateAvailability => "update availability",
            StepKind::ViewPatientHistory => "patient history",
            StepKind::ViewDashboard => "admin dashboard",
            StepKind::VerifyHealthcare => "verify healthcare",
            StepKind::ManageUsers => "manage users",
            StepKind::ViewReports => "view reports",
            StepKind::SystemHealth => "system health",
        }
    }

    pub fn check(&self) -> StepCheck {
        let (expected_status, max_latency_ms) = match self {
            StepKind::Register => (201, 3000),
            StepKind::Login => (200, 2000),
            StepKind::Logout => (200, 1000),
            StepKind::SearchHealthcare => (200, 2000),
            StepKind::BookConsultation => (201, 3000),
            StepKind::SubmitPayment => (201, 3000),
            StepKind::ViewConsultationHistory => (200, 1500),
            StepKind::UpdateProfile => (200, 2000),
            StepKind::ViewSchedule => (200, 1500),
            StepKind::AcceptConsultation => (200, 2000),
            StepKind::EndConsultation => (200, 2000),
            StepKind::WritePrescription => (201, 2000),
            StepKind::UpdateAvailability => (200, 2000),
            StepKind::ViewPatientHistory => (200, 2000),
            StepKind::ViewDashboard => (200, 3000),
            StepKind::VerifyHealthcare => (200, 2000),
            StepKind::ManageUsers => (200, 2000),
            StepKind::ViewReports => (200, 5000),
            StepKind::SystemHealth => (200, 1000),
        };

        StepCheck {
            expected_status,
            max_latency: Duration::from_millis(max_latency_ms),
        }
    }

    /// Business-outcome channel fed by this step's status check, if any.
    pub fn rate_channel(&self) -> Option<Channel> {
        match self {
            StepKind::Register | StepKind::Login => Some(Channel::LoginSuccess),
            StepKind::BookConsultation => Some(Channel::ConsultationSuccess),
            StepKind::SubmitPayment => Some(Channel::PaymentSuccess),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub kind: StepKind,
    pub response: StepResponse,
    pub status_ok: bool,
    pub latency_ok: bool,
    pub body_ok: bool,
}

impl StepOutcome {
    pub fn passed(&self) -> bool {
        self.status_ok && self.latency_ok && self.body_ok
    }
}

/// Records one finished request: exactly one latency sample, every check,
/// and the business rate channel when the step has one. Goose is told
/// whether the request failed, which is what feeds `http_req_failed`.
/// `body_check` is an optional named predicate result for the response
/// payload.
pub async fn record_step(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    kind: StepKind,
    mut response: StepResponse,
    body_check: Option<(&str, bool)>,
) -> StepOutcome {
    let check = kind.check();
    let recorder = &ctx.recorder;

    let status_ok = response.has_status(check.expected_status);
    let latency_ok = response.latency <= check.max_latency;

    recorder.record_latency(response.latency).await;
    response.settle(user, kind.label());

    recorder
        .record_check(&format!("{} status is {}", kind.label(), check.expected_status), status_ok)
        .await;
    recorder
        .record_check(
            &format!("{} response time < {}ms", kind.label(), check.max_latency.as_millis()),
            latency_ok,
        )
        .await;

    let body_ok = match body_check {
        Some((name, ok)) => {
            recorder.record_check(&format!("{} {}", kind.label(), name), ok).await;
            ok
        }
        None => true,
    };

    if let Some(channel) = kind.rate_channel() {
        recorder.record_boolean(channel, status_ok).await;
    }

    let outcome = StepOutcome {
        kind,
        response,
        status_ok,
        latency_ok,
        body_ok,
    };

    if !outcome.passed() {
        debug!(
            step = kind.label(),
            status = ?outcome.response.status,
            latency_ms = outcome.response.latency_ms(),
            error = ?outcome.response.error,
            "Step check failed"
        );
    }

    outcome
}

fn apply_auth(session: &mut SessionState, outcome: &StepOutcome) -> bool {
    if !outcome.status_ok {
        return false;
    }
    match outcome.response.body.as_ref().and_then(AuthResponse::from_body) {
        Some(auth) => {
            let user_id = auth.user.id_string().unwrap_or_default();
            session.sign_in(auth.token, user_id);
            true
        }
        None => false,
    }
}

fn has_auth_body(response: &StepResponse) -> bool {
    response.body.as_ref().and_then(AuthResponse::from_body).is_some()
}

#[instrument(skip(ctx, user, session, password))]
pub async fn login(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &mut SessionState,
    email: &str,
    password: &str,
) -> StepOutcome {
    let body = json!({
        "email": email,
        "password": password,
        "userType": session.user_type.as_str(),
    });

    let response = ctx
        .client
        .post(user, StepKind::Login.label(), &ctx.config.endpoints.auth.login, None, body)
        .await;
    let has_token = has_auth_body(&response);
    let outcome = record_step(ctx, user, StepKind::Login, response, Some(("has token", has_token))).await;

    if !apply_auth(session, &outcome) {
        warn!("Login failed for {} ({:?})", email, outcome.response.status);
    }

    outcome
}

#[instrument(skip_all, fields(email = %account.email))]
pub async fn register(
    ctx: &JourneyContext,
    user: &mut GooseUser,
    session: &mut SessionState,
    account: &SyntheticUser,
) -> StepOutcome {
    let body = json!({
        "name": account.name,
        "email": account.email,
        "phone": account.phone,
        "password": account.password,
        "nationalId": account.national_id,
        "dateOfBirth": account.date_of_birth,
        "gender": account.gender,
        "address": account.address,
        "userType": session.user_type.as_str(),
    });

    let response = ctx
        .client
        .post(user, StepKind::Register.label(), &ctx.config.endpoints.auth.register, None, body)
        .await;
    let has_token = has_auth_body(&response);
    let outcome = record_step(ctx, user, StepKind::Register, response, Some(("has token", has_token))).await;

    if !apply_auth(session, &outcome) {
        warn!("Registration failed for {} ({:?})", account.email, outcome.response.status);
    }

    outcome
}

/// Credentials are cleared whatever the server answers.
#[instrument(skip_all)]
pub async fn logout(ctx: &JourneyContext, user: &mut GooseUser, session: &mut SessionState) -> StepOutcome {
    let response = ctx
        .client
        .post(
            user,
            StepKind::Logout.label(),
            &ctx.config.endpoints.auth.logout,
            session.bearer(),
            json!({}),
        )
        .await;

    session.clear();

    record_step(ctx, user, StepKind::Logout, response, None).await
}
