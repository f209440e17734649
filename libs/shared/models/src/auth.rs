use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the platform's login and register endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// The platform hands out numeric ids on some deployments and uuids on others.
    pub id: Value,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "userType")]
    pub user_type: Option<String>,
}

impl AuthUser {
    pub fn id_string(&self) -> Option<String> {
        match &self.id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl AuthResponse {
    /// Parses an auth body, returning `None` when the token or user id is missing.
    pub fn from_body(body: &Value) -> Option<Self> {
        let parsed: AuthResponse = serde_json::from_value(body.clone()).ok()?;
        if parsed.token.is_empty() || parsed.user.id_string().is_none() {
            return None;
        }
        Some(parsed)
    }
}
