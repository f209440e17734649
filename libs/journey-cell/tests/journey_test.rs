use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixture_cell::FixtureSet;
use journey_cell::journeys::healthcare::view_patient_history;
use journey_cell::journeys::patient::{search_healthcare, submit_payment};
use journey_cell::steps::{login, logout};
use journey_cell::{
    run_admin_journey, run_healthcare_journey, run_iteration, run_patient_journey, JourneyContext, StepKind,
};
use metrics_cell::{Channel, MetricsCollector, MetricsRecorder, RequestTotals};
use shared_config::LoadTestConfig;
use shared_models::{Role, SessionState};
use shared_utils::test_utils::{goose_user, MockPlatform, MockPlatformResponses, TestConfig};

fn create_context(config: LoadTestConfig, recorder: Arc<dyn MetricsRecorder>) -> JourneyContext {
    let mut rng = StdRng::seed_from_u64(7);
    let fixtures = FixtureSet::generate(config.patient_count, config.healthcare_count, &mut rng).shared();

    JourneyContext::new(Arc::new(config), fixtures, recorder).unwrap()
}

fn context_for(server: &MockServer, collector: &Arc<MetricsCollector>) -> JourneyContext {
    let config = TestConfig::for_server(server).to_load_test_config();
    create_context(config, collector.clone())
}

fn collector() -> Arc<MetricsCollector> {
    Arc::new(MetricsCollector::new().unwrap())
}

/// Counts calls per recorder method; used to pin the one-sample-per-request rule.
#[derive(Default)]
struct CountingRecorder {
    latencies: AtomicUsize,
    booleans: AtomicUsize,
    checks: AtomicUsize,
    iterations: AtomicUsize,
}

#[async_trait]
impl MetricsRecorder for CountingRecorder {
    async fn record_latency(&self, _latency: Duration) {
        self.latencies.fetch_add(1, Ordering::SeqCst);
    }

    async fn record_boolean(&self, _channel: Channel, _outcome: bool) {
        self.booleans.fetch_add(1, Ordering::SeqCst);
    }

    async fn record_check(&self, _name: &str, _passed: bool) {
        self.checks.fetch_add(1, Ordering::SeqCst);
    }

    async fn record_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::SeqCst);
    }
}

async fn request_bodies(server: &MockServer, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

async fn request_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.url.path().to_string())
        .collect()
}

async fn mount_login_rejection(server: &MockServer) {
    for auth_path in ["/auth/login", "/auth/register"] {
        Mock::given(method("POST"))
            .and(path(auth_path))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(MockPlatformResponses::error_response("Invalid credentials", "UNAUTHORIZED")),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_login_search_logout_flow() {
    let server = MockServer::start().await;
    MockPlatform::mount_happy_path(&server).await;

    let collector = collector();
    let ctx = context_for(&server, &collector);
    let mut user = goose_user(&server.uri());
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = SessionState::new(Role::Patient);

    let outcome = login(&ctx, &mut user, &mut session, "patient1@loadtest.example.com", "LoadTest123!").await;
    assert!(outcome.passed());
    assert!(session.is_authenticated());
    assert_eq!(session.user_id.as_deref(), Some("1"));
    assert_eq!(outcome.response.metric.as_ref().unwrap().name, "login");

    let search = search_healthcare(&ctx, &mut user, &session, &mut rng).await;
    assert!(search.status_ok);
    assert!(search.body_ok);

    let outcome = logout(&ctx, &mut user, &mut session).await;
    assert_eq!(outcome.kind, StepKind::Logout);
    assert!(!session.is_authenticated());
    assert_eq!(session.user_type, Role::Patient);

    assert_eq!(collector.latency_count().await, 3);

    let snapshot = collector.snapshot(&RequestTotals::new().unwrap()).await;
    let login_rate = snapshot.rate(Channel::LoginSuccess).unwrap();
    assert_eq!((login_rate.passes, login_rate.fails), (1, 0));

    let logins = request_bodies(&server, "/auth/login").await;
    assert_eq!(logins[0]["userType"], "patient");
}

#[tokio::test]
async fn test_search_sends_bearer_token() {
    let server = MockServer::start().await;
    MockPlatform::mount_happy_path(&server).await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());
    let mut rng = StdRng::seed_from_u64(2);
    let mut session = SessionState::new(Role::Patient);

    login(&ctx, &mut user, &mut session, "patient1@loadtest.example.com", "LoadTest123!").await;
    search_healthcare(&ctx, &mut user, &session, &mut rng).await;

    let requests = server.received_requests().await.unwrap();
    let search = requests.iter().find(|r| r.url.path() == "/healthcare").unwrap();
    let auth = search.headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with("Bearer "));
    assert!(search.url.query().unwrap_or_default().contains("available=true"));
}

#[tokio::test]
async fn test_server_error_still_records_one_sample() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthcare"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(MockPlatformResponses::error_response("boom", "INTERNAL")),
        )
        .mount(&server)
        .await;

    let recorder = Arc::new(CountingRecorder::default());
    let config = TestConfig::for_server(&server).to_load_test_config();
    let ctx = create_context(config, recorder.clone());
    let mut user = goose_user(&server.uri());
    let mut rng = StdRng::seed_from_u64(3);
    let session = SessionState::new(Role::Patient);

    let outcome = search_healthcare(&ctx, &mut user, &session, &mut rng).await;

    assert!(!outcome.status_ok);
    assert!(!outcome.body_ok);
    assert_eq!(outcome.response.status, Some(500));
    assert!(!outcome.response.metric.as_ref().unwrap().success);
    assert_eq!(recorder.latencies.load(Ordering::SeqCst), 1);
    // search has no business rate channel
    assert_eq!(recorder.booleans.load(Ordering::SeqCst), 0);
    // status, latency, has results
    assert_eq!(recorder.checks.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unreachable_server_records_one_failed_sample() {
    let mut config = TestConfig::default().to_load_test_config();
    config.base_url = "http://127.0.0.1:9".to_string();

    let collector = collector();
    let ctx = create_context(config, collector.clone());
    let mut user = goose_user("http://127.0.0.1:9");
    let mut session = SessionState::new(Role::Patient);

    let outcome = login(&ctx, &mut user, &mut session, "nobody@loadtest.example.com", "x").await;

    assert_eq!(outcome.response.status, None);
    assert!(outcome.response.error.is_some());
    assert!(!session.is_authenticated());
    if let Some(metric) = &outcome.response.metric {
        assert!(!metric.success);
    }
    assert_eq!(collector.latency_count().await, 1);

    let snapshot = collector.snapshot(&RequestTotals::new().unwrap()).await;
    let login_rate = snapshot.rate(Channel::LoginSuccess).unwrap();
    assert_eq!(login_rate.fails, 1);
}

#[tokio::test]
async fn test_logout_clears_session_even_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());
    let mut session = SessionState::new(Role::Healthcare);
    session.sign_in("token".to_string(), "9".to_string());

    let outcome = logout(&ctx, &mut user, &mut session).await;

    assert!(!outcome.status_ok);
    assert!(!session.is_authenticated());
    assert_eq!(session.user_id, None);
    assert_eq!(session.user_type, Role::Healthcare);
}

#[tokio::test]
async fn test_failed_login_short_circuits_journey() {
    let server = MockServer::start().await;
    mount_login_rejection(&server).await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = SessionState::new(Role::Patient);

        let trace = run_patient_journey(&ctx, &mut user, &mut session, &mut rng).await;

        assert!(!trace.authenticated);
        assert_eq!(trace.steps.len(), 1);
        assert_matches!(trace.steps[0], StepKind::Login | StepKind::Register);
        assert!(!trace.logged_out());
    }

    let paths = request_paths(&server).await;
    assert!(paths.iter().all(|p| p.starts_with("/auth/")));
    assert!(paths.iter().all(|p| p != "/auth/logout"));
}

#[tokio::test]
async fn test_failed_healthcare_login_skips_rest_of_journey() {
    let server = MockServer::start().await;
    mount_login_rejection(&server).await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = SessionState::new(Role::Healthcare);

        let trace = run_healthcare_journey(&ctx, &mut user, &mut session, &mut rng).await;

        assert_eq!(trace.role, Role::Healthcare);
        assert!(!trace.authenticated);
        assert_eq!(trace.steps, vec![StepKind::Login]);
        assert!(!trace.logged_out());
        assert!(!session.is_authenticated());
    }

    let paths = request_paths(&server).await;
    assert_eq!(paths.len(), 10);
    assert!(paths.iter().all(|p| p == "/auth/login"));
}

#[tokio::test]
async fn test_failed_admin_login_skips_rest_of_journey() {
    let server = MockServer::start().await;
    mount_login_rejection(&server).await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = SessionState::new(Role::Admin);

        let trace = run_admin_journey(&ctx, &mut user, &mut session, &mut rng).await;

        assert!(!trace.authenticated);
        assert_eq!(trace.steps, vec![StepKind::Login]);
        assert!(!trace.logged_out());
    }

    let paths = request_paths(&server).await;
    assert_eq!(paths.len(), 10);
    assert!(paths.iter().all(|p| p == "/auth/login"));
}

#[tokio::test]
async fn test_healthcare_prescription_follows_accept_and_end() {
    let server = MockServer::start().await;
    MockPlatform::mount_happy_path(&server).await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());
    let mut prescribed = 0;

    for seed in 0..60 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = SessionState::new(Role::Healthcare);

        let trace = run_healthcare_journey(&ctx, &mut user, &mut session, &mut rng).await;
        let position = |kind: StepKind| trace.steps.iter().position(|s| *s == kind);

        assert_eq!(trace.steps[0], StepKind::Login);
        assert_eq!(trace.steps[1], StepKind::ViewSchedule);
        assert!(trace.logged_out());

        match position(StepKind::AcceptConsultation) {
            Some(accept) => {
                let end = position(StepKind::EndConsultation).unwrap();
                assert_eq!(end, accept + 1);

                if let Some(prescription) = position(StepKind::WritePrescription) {
                    assert_eq!(prescription, end + 1);
                    prescribed += 1;
                }
            }
            None => {
                assert!(position(StepKind::EndConsultation).is_none());
                assert!(position(StepKind::WritePrescription).is_none());
            }
        }
    }

    assert!(prescribed > 0);

    // One user, so the server saw the calls in journey order.
    let paths = request_paths(&server).await;
    for (i, p) in paths.iter().enumerate() {
        if p == "/prescriptions" {
            assert!(paths[i - 1].ends_with("/end"), "{:?}", &paths[..=i]);
            assert!(paths[i - 2].ends_with("/join"), "{:?}", &paths[..=i]);
        }
    }
}

#[tokio::test]
async fn test_patient_history_path_ignores_endpoint_overrides() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/patients/\d+/history$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockPlatformResponses::empty_list_response()))
        .mount(&server)
        .await;

    let mut config = TestConfig::for_server(&server).to_load_test_config();
    config.endpoints.consultations.history = "/v2/consultations/history".to_string();
    config.endpoints.healthcare.list = "/v2/providers".to_string();
    config.endpoints.users.update = "/v2/me".to_string();

    let ctx = create_context(config, collector());
    let mut user = goose_user(&server.uri());
    let mut session = SessionState::new(Role::Healthcare);
    session.sign_in("token".to_string(), "3".to_string());

    let outcome = view_patient_history(&ctx, &mut user, &session, 42).await;

    assert!(outcome.passed());
    assert_eq!(request_paths(&server).await, vec!["/patients/42/history".to_string()]);
}

#[tokio::test]
async fn test_login_without_token_is_not_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": { "id": 1 } })))
        .mount(&server)
        .await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());
    let mut session = SessionState::new(Role::Patient);

    let outcome = login(&ctx, &mut user, &mut session, "patient1@loadtest.example.com", "LoadTest123!").await;

    assert!(outcome.status_ok);
    assert!(!outcome.body_ok);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_payment_sends_null_consultation_when_booking_failed() {
    let server = MockServer::start().await;
    MockPlatform::mount_happy_path(&server).await;

    let collector = collector();
    let ctx = context_for(&server, &collector);
    let mut user = goose_user(&server.uri());
    let mut rng = StdRng::seed_from_u64(4);
    let mut session = SessionState::new(Role::Patient);
    session.sign_in("token".to_string(), "1".to_string());

    let outcome = submit_payment(&ctx, &mut user, &session, None, &mut rng).await;
    assert!(outcome.passed());

    let payments = request_bodies(&server, "/payments").await;
    assert_eq!(payments.len(), 1);
    assert!(payments[0]["consultationId"].is_null());
    assert_eq!(payments[0]["amount"], 150_000);

    let snapshot = collector.snapshot(&RequestTotals::new().unwrap()).await;
    assert_eq!(snapshot.rate(Channel::PaymentSuccess).unwrap().passes, 1);
}

#[tokio::test]
async fn test_admin_journey_uses_configured_account() {
    let server = MockServer::start().await;
    MockPlatform::mount_happy_path(&server).await;

    let ctx = context_for(&server, &collector());
    let mut user = goose_user(&server.uri());
    let mut rng = StdRng::seed_from_u64(5);
    let mut session = SessionState::new(Role::Admin);

    let trace = run_admin_journey(&ctx, &mut user, &mut session, &mut rng).await;

    assert!(trace.authenticated);
    assert_eq!(trace.steps[0], StepKind::Login);
    assert_eq!(trace.steps[1], StepKind::ViewDashboard);
    assert!(trace.logged_out());
    assert!(!session.is_authenticated());

    let logins = request_bodies(&server, "/auth/login").await;
    assert_eq!(logins[0]["email"], "admin@loadtest.local");
    assert_eq!(logins[0]["userType"], "admin");
}

#[tokio::test]
async fn test_iterations_record_one_sample_per_step() {
    let server = MockServer::start().await;
    MockPlatform::mount_happy_path(&server).await;

    let collector = collector();
    let ctx = context_for(&server, &collector);
    let mut user = goose_user(&server.uri());
    let mut rng = StdRng::seed_from_u64(42);

    let mut total_steps = 0;
    let mut roles = Vec::new();
    for _ in 0..40 {
        let trace = run_iteration(&ctx, &mut user, &mut rng).await;

        assert!(trace.authenticated, "{} iteration did not authenticate", trace.role);
        assert!(trace.logged_out());
        assert_eq!(trace.failed_steps, 0);
        assert_eq!(trace.steps.iter().filter(|s| **s == StepKind::Logout).count(), 1);

        total_steps += trace.steps.len();
        roles.push(trace.role);
    }

    assert!(roles.contains(&Role::Patient));
    assert!(roles.contains(&Role::Healthcare));
    assert_eq!(collector.latency_count().await, total_steps as u64);
    assert_eq!(collector.iterations(), 40);
    assert_eq!(server.received_requests().await.unwrap().len(), total_steps);
}
