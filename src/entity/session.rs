use serde::{Deserialize, Serialize};

/// Role derived from the backend's `roleId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Member,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn from_role_id(role_id: &str) -> Self {
        match role_id.trim() {
            "1" => Role::SuperAdmin,
            "2" => Role::Admin,
            _ => Role::Member,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super-admin"),
        }
    }
}

/// Session issued by the backend on login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "roleId")]
    pub role_id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

impl Session {
    pub fn role(&self) -> Role {
        Role::from_role_id(&self.role_id)
    }
}
