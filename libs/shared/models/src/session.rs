use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Healthcare,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Healthcare => "healthcare",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials held by one virtual user for the length of one iteration.
///
/// A fresh value is created at the start of every iteration and passed by
/// `&mut` through the journey, so nothing survives into the next iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub auth_token: Option<String>,
    pub user_id: Option<String>,
    pub user_type: Role,
}

impl SessionState {
    pub fn new(user_type: Role) -> Self {
        Self {
            auth_token: None,
            user_id: None,
            user_type,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn sign_in(&mut self, token: String, user_id: String) {
        self.auth_token = Some(token);
        self.user_id = Some(user_id);
    }

    pub fn clear(&mut self) {
        self.auth_token = None;
        self.user_id = None;
    }

    pub fn bearer(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}
