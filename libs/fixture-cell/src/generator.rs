use std::sync::Arc;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use shared_models::SyntheticUser;

pub const NATIONAL_ID_LENGTH: usize = 16;
pub const PHONE_LENGTH: usize = 12;
pub const DEFAULT_PASSWORD: &str = "LoadTest123!";

pub const SPECIALIZATIONS: &[&str] = &[
    "General Practice",
    "Cardiology",
    "Dermatology",
    "Pediatrics",
    "Neurology",
    "Orthopedics",
    "Psychiatry",
    "Internal Medicine",
    "Obstetrics and Gynecology",
    "Ophthalmology",
];

const AFFILIATIONS: &[&str] = &[
    "City General Hospital",
    "St. Mary Medical Center",
    "Harapan Kita Heart Center",
    "Community Health Clinic",
    "University Teaching Hospital",
];

const CITIES: &[&str] = &["Jakarta", "Bandung", "Surabaya", "Medan", "Yogyakarta"];

const GENDERS: &[&str] = &["male", "female"];

/// Read-only accounts shared across all virtual users.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    pub patients: Vec<SyntheticUser>,
    pub healthcare: Vec<SyntheticUser>,
}

pub type SharedFixtures = Arc<FixtureSet>;

impl FixtureSet {
    pub fn generate<R: Rng + ?Sized>(patient_count: usize, healthcare_count: usize, rng: &mut R) -> Self {
        let set = Self {
            patients: FixtureGenerator::patients(patient_count, rng),
            healthcare: FixtureGenerator::healthcare_professionals(healthcare_count, rng),
        };

        info!(
            "Generated {} patient and {} healthcare fixtures",
            set.patients.len(),
            set.healthcare.len()
        );

        set
    }

    pub fn shared(self) -> SharedFixtures {
        Arc::new(self)
    }

    pub fn random_patient<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SyntheticUser> {
        self.patients.choose(rng)
    }

    pub fn random_healthcare<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SyntheticUser> {
        self.healthcare.choose(rng)
    }
}

/// Digits drawn uniformly from `0-9`; leading zeros are allowed.
pub fn random_digits<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn pick<R: Rng + ?Sized>(values: &[&'static str], rng: &mut R) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

pub struct FixtureGenerator;

impl FixtureGenerator {
    pub fn patients<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<SyntheticUser> {
        (1..=count as u64).map(|id| Self::patient(id, rng)).collect()
    }

    pub fn healthcare_professionals<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<SyntheticUser> {
        (1..=count as u64).map(|id| Self::healthcare(id, rng)).collect()
    }

    pub fn patient<R: Rng + ?Sized>(id: u64, rng: &mut R) -> SyntheticUser {
        SyntheticUser {
            id,
            name: format!("Load Test Patient {}", id),
            email: format!("patient{}@loadtest.example.com", id),
            phone: Self::phone(rng),
            national_id: random_digits(NATIONAL_ID_LENGTH, rng),
            password: DEFAULT_PASSWORD.to_string(),
            date_of_birth: Some(Self::date_of_birth(rng)),
            gender: Some(pick(GENDERS, rng).to_string()),
            address: Some(format!("{} Test Street, {}", rng.gen_range(1..=999), pick(CITIES, rng))),
            specialization: None,
            license_numbers: None,
            experience_years: None,
            affiliation: None,
        }
    }

    pub fn healthcare<R: Rng + ?Sized>(id: u64, rng: &mut R) -> SyntheticUser {
        SyntheticUser {
            id,
            name: format!("Dr. Load Test {}", id),
            email: format!("doctor{}@loadtest.example.com", id),
            phone: Self::phone(rng),
            national_id: random_digits(NATIONAL_ID_LENGTH, rng),
            password: DEFAULT_PASSWORD.to_string(),
            date_of_birth: None,
            gender: Some(pick(GENDERS, rng).to_string()),
            address: None,
            specialization: Some(pick(SPECIALIZATIONS, rng).to_string()),
            license_numbers: Some(vec![
                format!("STR-{}", random_digits(10, rng)),
                format!("SIP-{}", random_digits(10, rng)),
            ]),
            experience_years: Some(rng.gen_range(1..=30)),
            affiliation: Some(pick(AFFILIATIONS, rng).to_string()),
        }
    }

    /// A brand-new patient for the registration path. The email carries a
    /// uuid so repeated registrations never collide on the server.
    pub fn registration_patient<R: Rng + ?Sized>(rng: &mut R) -> SyntheticUser {
        let mut user = Self::patient(0, rng);
        let tag = Uuid::new_v4().simple().to_string();
        user.name = format!("Load Test Registrant {}", &tag[..8]);
        user.email = format!("register.{}@loadtest.example.com", tag);
        user
    }

    fn phone<R: Rng + ?Sized>(rng: &mut R) -> String {
        format!("08{}", random_digits(PHONE_LENGTH - 2, rng))
    }

    fn date_of_birth<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
        let year = rng.gen_range(1950..=2005);
        let month = rng.gen_range(1..=12);
        let day = rng.gen_range(1..=28);
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }
}
