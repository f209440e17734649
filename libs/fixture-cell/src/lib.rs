// =====================================================================================
// FIXTURE CELL - SYNTHETIC PATIENTS & HEALTHCARE PROFESSIONALS
// =====================================================================================
//
// Generates the accounts virtual users log in with. The set is built once per
// process and handed to every virtual user behind an `Arc`.
//
// =====================================================================================

pub mod generator;

pub use generator::{
    random_digits, FixtureGenerator, FixtureSet, SharedFixtures, NATIONAL_ID_LENGTH, PHONE_LENGTH,
    SPECIALIZATIONS,
};
