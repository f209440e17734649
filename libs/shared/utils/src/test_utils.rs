use std::path::PathBuf;
use std::time::Duration;

use goose::config::GooseConfiguration;
use goose::goose::GooseUser;
use goose::metrics::GooseCoordinatedOmissionMitigation;
use gumdrop::Options;
use reqwest::Url;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::{ConsultationPause, EndpointConfig, LoadProfile, LoadTestConfig};

pub struct TestConfig {
    pub base_url: String,
    pub patient_count: usize,
    pub healthcare_count: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            patient_count: 5,
            healthcare_count: 5,
        }
    }
}

impl TestConfig {
    pub fn for_server(server: &MockServer) -> Self {
        Self {
            base_url: server.uri(),
            ..Default::default()
        }
    }

    /// Config with no think time and no consultation pause so journeys run
    /// as fast as the mock server answers.
    pub fn to_load_test_config(&self) -> LoadTestConfig {
        LoadTestConfig {
            base_url: self.base_url.clone(),
            profile: LoadProfile::Smoke,
            patient_count: self.patient_count,
            healthcare_count: self.healthcare_count,
            admin_email: "admin@loadtest.local".to_string(),
            admin_password: "Admin123!".to_string(),
            request_timeout: Duration::from_secs(5),
            think_time: Duration::ZERO,
            consultation_pause: ConsultationPause {
                min: Duration::ZERO,
                max: Duration::ZERO,
            },
            graceful_stop: Duration::from_secs(1),
            results_dir: PathBuf::from("results"),
            endpoints: EndpointConfig::default(),
        }
    }
}

/// A standalone goose user pointed at `base_url`, outside of any attack.
/// Its requests go out normally but feed no aggregated metrics.
pub fn goose_user(base_url: &str) -> GooseUser {
    let mut configuration =
        GooseConfiguration::parse_args_default(&[] as &[&str]).expect("default goose configuration parses");
    configuration.co_mitigation = Some(GooseCoordinatedOmissionMitigation::Disabled);
    let base_url = Url::parse(base_url).expect("base url is valid");

    GooseUser::single(base_url, &configuration).expect("single goose user builds")
}

pub struct MockPlatformResponses;

impl MockPlatformResponses {
    pub fn auth_response(user_id: &str, token: &str) -> serde_json::Value {
        json!({
            "token": token,
            "user": {
                "id": user_id,
                "email": "test@example.com",
                "userType": "patient"
            }
        })
    }

    pub fn healthcare_list_response() -> serde_json::Value {
        json!({
            "data": [
                {
                    "id": 1,
                    "name": "Dr. Sarah Johnson",
                    "specialization": "Cardiology",
                    "available": true,
                    "consultationFee": 150000
                },
                {
                    "id": 2,
                    "name": "Dr. Budi Santoso",
                    "specialization": "General Practice",
                    "available": true,
                    "consultationFee": 100000
                }
            ],
            "total": 2
        })
    }

    pub fn empty_list_response() -> serde_json::Value {
        json!({ "data": [], "total": 0 })
    }

    pub fn consultation_created(consultation_id: u64) -> serde_json::Value {
        json!({
            "consultationId": consultation_id,
            "status": "pending",
            "createdAt": "2024-01-01T00:00:00Z"
        })
    }

    pub fn payment_created(consultation_id: u64) -> serde_json::Value {
        json!({
            "paymentId": Uuid::new_v4(),
            "consultationId": consultation_id,
            "paymentUrl": format!("https://pay.example.com/checkout/{}", consultation_id)
        })
    }

    pub fn ok() -> serde_json::Value {
        json!({ "success": true })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}

pub struct MockPlatform;

impl MockPlatform {
    /// Mounts a healthy response for every endpoint a journey can touch,
    /// using the default endpoint table.
    pub async fn mount_happy_path(server: &MockServer) {
        let token = Uuid::new_v4().to_string();

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(MockPlatformResponses::auth_response("101", &token)))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::auth_response("1", &token)))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::ok()))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/healthcare"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::healthcare_list_response()))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/consultations"))
            .respond_with(ResponseTemplate::new(201).set_body_json(MockPlatformResponses::consultation_created(77)))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(MockPlatformResponses::payment_created(77)))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/consultations/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::empty_list_response()))
            .mount(server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::ok()))
            .mount(server)
            .await;

        for verb in ["GET", "PUT"] {
            Mock::given(method(verb))
                .and(path("/healthcare/availability"))
                .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::ok()))
                .mount(server)
                .await;
        }

        Mock::given(method("POST"))
            .and(path_regex(r"^/consultations/\d+/(join|end)$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::ok()))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/prescriptions"))
            .respond_with(ResponseTemplate::new(201).set_body_json(MockPlatformResponses::ok()))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/patients/\d+/history$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::empty_list_response()))
            .mount(server)
            .await;

        for admin_path in ["/admin/dashboard", "/admin/users", "/admin/reports", "/system/health"] {
            Mock::given(method("GET"))
                .and(path(admin_path))
                .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::ok()))
                .mount(server)
                .await;
        }

        Mock::given(method("PUT"))
            .and(path_regex(r"^/admin/healthcare/verify/\d+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::ok()))
            .mount(server)
            .await;
    }
}
