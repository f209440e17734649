use serde::{Deserialize, Serialize};

/// Path table for the platform API. Any subset can be overridden from a JSON
/// file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub auth: AuthEndpoints,
    pub healthcare: HealthcareEndpoints,
    pub consultations: ConsultationEndpoints,
    pub payments: PaymentEndpoints,
    pub prescriptions: PrescriptionEndpoints,
    pub users: UserEndpoints,
    pub admin: AdminEndpoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEndpoints {
    pub register: String,
    pub login: String,
    pub logout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthcareEndpoints {
    pub list: String,
    pub availability: String,
    pub verification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationEndpoints {
    pub create: String,
    pub history: String,
    pub join: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentEndpoints {
    pub create: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrescriptionEndpoints {
    pub create: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserEndpoints {
    pub update: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminEndpoints {
    pub dashboard: String,
    pub users: String,
    pub reports: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            auth: AuthEndpoints::default(),
            healthcare: HealthcareEndpoints::default(),
            consultations: ConsultationEndpoints::default(),
            payments: PaymentEndpoints::default(),
            prescriptions: PrescriptionEndpoints::default(),
            users: UserEndpoints::default(),
            admin: AdminEndpoints::default(),
        }
    }
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            register: "/auth/register".to_string(),
            login: "/auth/login".to_string(),
            logout: "/auth/logout".to_string(),
        }
    }
}

impl Default for HealthcareEndpoints {
    fn default() -> Self {
        Self {
            list: "/healthcare".to_string(),
            availability: "/healthcare/availability".to_string(),
            verification: "/admin/healthcare/verify".to_string(),
        }
    }
}

impl Default for ConsultationEndpoints {
    fn default() -> Self {
        Self {
            create: "/consultations".to_string(),
            history: "/consultations/history".to_string(),
            join: "/consultations/{id}/join".to_string(),
            end: "/consultations/{id}/end".to_string(),
        }
    }
}

impl Default for PaymentEndpoints {
    fn default() -> Self {
        Self { create: "/payments".to_string() }
    }
}

impl Default for PrescriptionEndpoints {
    fn default() -> Self {
        Self { create: "/prescriptions".to_string() }
    }
}

impl Default for UserEndpoints {
    fn default() -> Self {
        Self { update: "/users/profile".to_string() }
    }
}

impl Default for AdminEndpoints {
    fn default() -> Self {
        Self {
            dashboard: "/admin/dashboard".to_string(),
            users: "/admin/users".to_string(),
            reports: "/admin/reports".to_string(),
        }
    }
}

/// Fills the `{id}` placeholder of a path template. Templates without a
/// placeholder get the id appended as a trailing segment.
pub fn with_id(template: &str, id: impl std::fmt::Display) -> String {
    if template.contains("{id}") {
        template.replace("{id}", &id.to_string())
    } else {
        format!("{}/{}", template.trim_end_matches('/'), id)
    }
}
