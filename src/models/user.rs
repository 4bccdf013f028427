use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// What the client-side auth store persisted under `auth-storage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_admin: bool,
}

impl AuthSnapshot {
    pub fn signed_out() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_admin: false,
        }
    }

    pub fn signed_in(user: User) -> Self {
        let is_admin = user.role == Role::Admin;
        Self {
            user: Some(user),
            is_authenticated: true,
            is_admin,
        }
    }
}
