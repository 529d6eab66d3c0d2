//! User and pending-registration entities.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A confirmed dashboard user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password: String,
    pub is_admin: bool,
    pub language: String,
    pub theme: String,
}

/// Data required to create a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Pre-hashed password.
    pub password: String,
    pub is_admin: bool,
    pub language: Option<String>,
    pub theme: Option<String>,
}

/// Partial user update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.language.is_none()
            && self.theme.is_none()
    }
}

/// A registration awaiting email confirmation.
///
/// Lives in the key-value store until it is confirmed or expires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Pre-hashed password.
    pub password: String,
    pub is_admin: bool,
}

impl From<PreUser> for CreateUser {
    fn from(pre: PreUser) -> Self {
        Self {
            name: pre.name,
            email: pre.email,
            password: pre.password,
            is_admin: pre.is_admin,
            language: None,
            theme: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_is_empty() {
        let mut update = UpdateUser {
            id: Uuid::new_v4(),
            ..Default::default()
        };
        assert!(update.is_empty());
        update.theme = Some("dark".into());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_password_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "alice".into(),
            email: "alice@example.com".into(),
            password: "$argon2id$secret".into(),
            is_admin: false,
            language: "en".into(),
            theme: "light".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
    }
}
