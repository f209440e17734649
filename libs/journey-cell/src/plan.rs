use std::time::Duration;

use rand::Rng;

use shared_config::ConsultationPause;

pub const REGISTER_PROBABILITY: f64 = 0.20;
pub const BOOK_PROBABILITY: f64 = 0.30;
pub const PAY_AFTER_BOOKING_PROBABILITY: f64 = 0.80;
pub const VIEW_HISTORY_PROBABILITY: f64 = 0.40;
pub const UPDATE_PROFILE_PROBABILITY: f64 = 0.20;

pub const ACCEPT_CONSULTATION_PROBABILITY: f64 = 0.50;
pub const PRESCRIBE_AFTER_ACCEPT_PROBABILITY: f64 = 0.70;
pub const UPDATE_AVAILABILITY_PROBABILITY: f64 = 0.30;
pub const VIEW_PATIENT_HISTORY_PROBABILITY: f64 = 0.40;

pub const VERIFY_HEALTHCARE_PROBABILITY: f64 = 0.60;
pub const MANAGE_USERS_PROBABILITY: f64 = 0.40;
pub const VIEW_REPORTS_PROBABILITY: f64 = 0.50;
pub const SYSTEM_HEALTH_PROBABILITY: f64 = 0.30;

/// Upper bound for ids that are drawn at random rather than taken from a
/// real booking (patient history lookups, consultations to join).
pub const RANDOM_RECORD_ID_MAX: u64 = 1000;
/// Healthcare professional ids the admin verifies are drawn from `1..=100`.
pub const VERIFICATION_ID_MAX: u64 = 100;

/// One uniform draw in `[0, 1)` compared against `probability`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Which optional steps a patient iteration will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientPlan {
    pub register: bool,
    pub book_consultation: bool,
    /// Only ever true when `book_consultation` is.
    pub pay: bool,
    pub view_history: bool,
    pub update_profile: bool,
}

impl PatientPlan {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let register = chance(rng, REGISTER_PROBABILITY);
        let book_consultation = chance(rng, BOOK_PROBABILITY);
        let pay = book_consultation && chance(rng, PAY_AFTER_BOOKING_PROBABILITY);
        let view_history = chance(rng, VIEW_HISTORY_PROBABILITY);
        let update_profile = chance(rng, UPDATE_PROFILE_PROBABILITY);

        Self {
            register,
            book_consultation,
            pay,
            view_history,
            update_profile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthcarePlan {
    pub accept_consultation: bool,
    pub consultation_id: u64,
    pub consultation_pause: Duration,
    /// Only ever true when `accept_consultation` is.
    pub prescribe: bool,
    pub update_availability: bool,
    pub view_patient_history: bool,
    pub patient_id: u64,
}

impl HealthcarePlan {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, pause: ConsultationPause) -> Self {
        let accept_consultation = chance(rng, ACCEPT_CONSULTATION_PROBABILITY);
        let prescribe = accept_consultation && chance(rng, PRESCRIBE_AFTER_ACCEPT_PROBABILITY);
        let update_availability = chance(rng, UPDATE_AVAILABILITY_PROBABILITY);
        let view_patient_history = chance(rng, VIEW_PATIENT_HISTORY_PROBABILITY);

        let consultation_pause = if pause.max > pause.min {
            rng.gen_range(pause.min..=pause.max)
        } else {
            pause.min
        };

        Self {
            accept_consultation,
            consultation_id: rng.gen_range(1..=RANDOM_RECORD_ID_MAX),
            consultation_pause,
            prescribe,
            update_availability,
            view_patient_history,
            patient_id: rng.gen_range(1..=RANDOM_RECORD_ID_MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminPlan {
    pub verify_healthcare: bool,
    pub healthcare_id: u64,
    pub manage_users: bool,
    pub view_reports: bool,
    pub system_health: bool,
}

impl AdminPlan {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            verify_healthcare: chance(rng, VERIFY_HEALTHCARE_PROBABILITY),
            healthcare_id: rng.gen_range(1..=VERIFICATION_ID_MAX),
            manage_users: chance(rng, MANAGE_USERS_PROBABILITY),
            view_reports: chance(rng, VIEW_REPORTS_PROBABILITY),
            system_health: chance(rng, SYSTEM_HEALTH_PROBABILITY),
        }
    }
}
