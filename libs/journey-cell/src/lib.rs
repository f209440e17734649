// =====================================================================================
// JOURNEY CELL - ROLE SELECTION & USER JOURNEYS
// =====================================================================================
//
// One call to `run_iteration` is one goose-user iteration:
// - a single random draw picks the role (patient / healthcare / admin)
// - a fresh `SessionState` is created and threaded through that role's journey
// - every step is one named goose request; its latency and checks also go
//   to the recorder
//
// `journey_scenario` wraps `run_iteration` as the run's only goose scenario.
//
// =====================================================================================

pub mod context;
pub mod journeys;
pub mod plan;
pub mod scenario;
pub mod selector;
pub mod steps;
pub mod warmup;

pub use context::JourneyContext;
pub use journeys::{run_admin_journey, run_healthcare_journey, run_iteration, run_patient_journey, JourneyTrace};
pub use scenario::{journey_scenario, ITERATION_NAME, SCENARIO_NAME};
pub use plan::{AdminPlan, HealthcarePlan, PatientPlan};
pub use selector::{select_role, select_weighted, ROLE_TABLE};
pub use steps::{StepCheck, StepKind, StepOutcome};
pub use warmup::warm_up;
