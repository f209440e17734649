use std::time::{Duration, Instant};

use anyhow::Result;
use goose::goose::{GooseMethod, GooseRequest, GooseUser};
use goose::metrics::GooseRequestMetric;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use shared_config::LoadTestConfig;

/// What one request produced. Transport failures and timeouts leave `status`
/// empty; callers treat that the same as a wrong status code.
#[derive(Debug, Clone)]
pub struct StepResponse {
    pub status: Option<u16>,
    pub latency: Duration,
    pub body: Option<Value>,
    pub error: Option<String>,
    /// Goose's record of the request. `None` for setup probes and for
    /// requests goose refused to build.
    pub metric: Option<GooseRequestMetric>,
}

impl StepResponse {
    fn unsent(latency: Duration, error: String) -> Self {
        Self {
            status: None,
            latency,
            body: None,
            error: Some(error),
            metric: None,
        }
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }

    pub fn has_status(&self, expected: u16) -> bool {
        self.status == Some(expected)
    }

    /// Counts as a failed request for `http_req_failed`.
    pub fn is_failure(&self) -> bool {
        !matches!(self.status, Some(code) if code < 400)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.as_ref()?.get(key)
    }

    pub fn field_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_value(self.field(key)?.clone()).ok()
    }

    /// Tells goose whether this request failed, using the same rule as
    /// `is_failure`, so goose's request table and report agree with
    /// `http_req_failed`.
    pub fn settle(&mut self, user: &mut GooseUser, tag: &str) {
        let failed = self.is_failure();
        let Some(metric) = self.metric.as_mut() else {
            return;
        };

        if failed {
            // set_failure always hands the failure back as an Err; the journey
            // carries on regardless.
            let _ = user.set_failure(tag, metric, None, None);
        } else if let Err(e) = user.set_success(metric) {
            debug!("Could not mark '{}' as a success: {}", tag, e);
        }
    }
}

/// Issues journey steps as named goose requests on the calling user.
/// The setup probe goes through a separate reqwest client so it never shows
/// up in goose's metrics.
#[derive(Clone)]
pub struct ApiClient {
    probe: Client,
    base_url: String,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &LoadTestConfig) -> Result<Self> {
        let probe = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("consultation-load-test/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            probe,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Plain GET outside of any goose user, for checks made before the load
    /// starts.
    pub async fn probe(&self, path: &str) -> StepResponse {
        let url = format!("{}{}", self.base_url, path);
        debug!("Probing {}", url);

        let start = Instant::now();
        let response = match self.probe.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return StepResponse::unsent(start.elapsed(), e.to_string()),
        };

        let status = response.status().as_u16();
        let body = response.json::<Value>().await.ok();

        StepResponse {
            status: Some(status),
            latency: start.elapsed(),
            body,
            error: None,
            metric: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn request(
        &self,
        user: &mut GooseUser,
        name: &str,
        method: GooseMethod,
        path: &str,
        auth_token: Option<&str>,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> StepResponse {
        debug!("Making {:?} request to {} as '{}'", method, path, name);

        let mut builder = match user.get_request_builder(&method, path) {
            Ok(builder) => builder.timeout(self.request_timeout),
            Err(e) => return StepResponse::unsent(Duration::ZERO, e.to_string()),
        };

        if let Some(token) = auth_token {
            builder = builder.bearer_auth(token);
        }

        if !query.is_empty() {
            builder = builder.query(query);
        }

        if let Some(body_data) = &body {
            builder = builder.json(body_data);
        }

        let goose_request = GooseRequest::builder()
            .method(method)
            .path(path)
            .name(name)
            .set_request_builder(builder)
            .build();

        let start = Instant::now();
        let goose = match user.request(goose_request).await {
            Ok(goose) => goose,
            Err(e) => {
                debug!("Goose rejected request to {}: {}", path, e);
                return StepResponse::unsent(start.elapsed(), e.to_string());
            }
        };

        let metric = Some(goose.request);
        let response = match goose.response {
            Ok(response) => response,
            Err(e) => {
                debug!("Request to {} failed: {}", path, e);
                return StepResponse {
                    status: None,
                    latency: start.elapsed(),
                    body: None,
                    error: Some(e.to_string()),
                    metric,
                };
            }
        };

        let status = response.status().as_u16();
        let text = response.text().await;
        let latency = start.elapsed();

        match text {
            Ok(text) => StepResponse {
                status: Some(status),
                latency,
                body: serde_json::from_str(&text).ok(),
                error: None,
                metric,
            },
            Err(e) => StepResponse {
                status: Some(status),
                latency,
                body: None,
                error: Some(e.to_string()),
                metric,
            },
        }
    }

    pub async fn get(
        &self,
        user: &mut GooseUser,
        name: &str,
        path: &str,
        auth_token: Option<&str>,
        query: &[(&str, String)],
    ) -> StepResponse {
        self.request(user, name, GooseMethod::Get, path, auth_token, query, None).await
    }

    pub async fn post(
        &self,
        user: &mut GooseUser,
        name: &str,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> StepResponse {
        self.request(user, name, GooseMethod::Post, path, auth_token, &[], Some(body)).await
    }

    pub async fn put(
        &self,
        user: &mut GooseUser,
        name: &str,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> StepResponse {
        self.request(user, name, GooseMethod::Put, path, auth_token, &[], Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_utils::test_utils::{goose_user, TestConfig};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str) -> ApiClient {
        let mut config = TestConfig::default().to_load_test_config();
        config.base_url = base_url.to_string();
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_authenticated_post_carries_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/consultations"))
            .and(header("Authorization", "Bearer abc"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"consultationId": 9})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let mut user = goose_user(&mock_server.uri());
        let response = client
            .post(&mut user, "book consultation", "/consultations", Some("abc"), json!({"x": 1}))
            .await;

        assert!(response.has_status(201));
        assert_eq!(response.field_as::<u64>("consultationId"), Some(9));
        assert!(!response.is_failure());
        assert_eq!(response.metric.unwrap().name, "book consultation");
    }

    #[tokio::test]
    async fn test_query_parameters_are_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/consultations/history"))
            .and(query_param("limit", "10"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let mut user = goose_user(&mock_server.uri());
        let response = client
            .get(
                &mut user,
                "consultation history",
                "/consultations/history",
                Some("t"),
                &[("limit", "10".to_string()), ("page", "1".to_string())],
            )
            .await;

        assert!(response.has_status(200));
    }

    #[tokio::test]
    async fn test_non_json_body_is_tolerated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/system/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let mut user = goose_user(&mock_server.uri());
        let response = client.get(&mut user, "system health", "/system/health", None, &[]).await;

        assert!(response.has_status(200));
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_collapses_to_empty_status() {
        let client = client_for("http://127.0.0.1:9");
        let mut user = goose_user("http://127.0.0.1:9");
        let mut response = client.get(&mut user, "login", "/auth/login", None, &[]).await;

        assert!(response.status.is_none());
        assert!(response.error.is_some());
        assert!(response.is_failure());

        response.settle(&mut user, "login");
        if let Some(metric) = response.metric {
            assert!(!metric.success);
        }
    }

    #[tokio::test]
    async fn test_settle_follows_failure_rule() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/healthcare/availability"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let mut user = goose_user(&mock_server.uri());

        let mut failed = client
            .put(&mut user, "update profile", "/users/profile", Some("t"), json!({}))
            .await;
        failed.settle(&mut user, "update profile");

        assert_eq!(failed.status, Some(503));
        assert!(failed.is_failure());
        assert!(!failed.metric.unwrap().success);

        let mut passed = client
            .put(&mut user, "update availability", "/healthcare/availability", Some("t"), json!({}))
            .await;
        passed.settle(&mut user, "update availability");

        assert!(passed.metric.unwrap().success);
    }

    #[tokio::test]
    async fn test_health_check_bypasses_goose() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&mock_server)
            .await;

        let response = client_for(&mock_server.uri()).probe("/health").await;

        assert!(response.has_status(200));
        assert_eq!(response.field_as::<String>("status").as_deref(), Some("ok"));
        assert!(response.metric.is_none());
    }
}
