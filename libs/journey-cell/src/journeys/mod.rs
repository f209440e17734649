pub mod admin;
pub mod healthcare;
pub mod patient;

use goose::goose::GooseUser;
use rand::Rng;
use tracing::{debug, instrument};

use shared_models::{Role, SessionState};

use crate::context::JourneyContext;
use crate::selector::select_role;
use crate::steps::{StepKind, StepOutcome};

pub use admin::run_admin_journey;
pub use healthcare::run_healthcare_journey;
pub use patient::run_patient_journey;

/// Which steps one iteration actually executed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyTrace {
    pub role: Role,
    pub authenticated: bool,
    pub steps: Vec<StepKind>,
    pub failed_steps: usize,
}

impl JourneyTrace {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            authenticated: false,
            steps: Vec::new(),
            failed_steps: 0,
        }
    }

    pub fn push(&mut self, outcome: &StepOutcome) {
        self.steps.push(outcome.kind);
        if !outcome.passed() {
            self.failed_steps += 1;
        }
    }

    pub fn contains(&self, kind: StepKind) -> bool {
        self.steps.contains(&kind)
    }

    pub fn logged_out(&self) -> bool {
        self.steps.last() == Some(&StepKind::Logout)
    }
}

/// One virtual-user iteration: draw a role, start from an empty session and
/// run that role's journey to completion on the given goose user.
#[instrument(skip_all)]
pub async fn run_iteration<R>(ctx: &JourneyContext, user: &mut GooseUser, rng: &mut R) -> JourneyTrace
where
    R: Rng + Send + ?Sized,
{
    let role = select_role(rng.gen::<f64>());
    let mut session = SessionState::new(role);

    let trace = match role {
        Role::Patient => run_patient_journey(ctx, user, &mut session, rng).await,
        Role::Healthcare => run_healthcare_journey(ctx, user, &mut session, rng).await,
        Role::Admin => run_admin_journey(ctx, user, &mut session, rng).await,
    };

    ctx.recorder.record_iteration().await;

    debug!(
        role = %trace.role,
        steps = trace.steps.len(),
        failed = trace.failed_steps,
        "Iteration finished"
    );

    trace
}
