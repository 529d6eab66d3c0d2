//! MQTT broker connection profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored broker profile. Credentials are AES-GCM ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Broker {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub server: String,
    pub port: i32,
    pub keep_alive: i32,
    pub icon_name: String,
    pub icon_background_color: String,
    pub is_ssl: bool,
    #[serde(skip_serializing)]
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBroker {
    pub user_id: Uuid,
    pub name: String,
    pub server: String,
    pub port: i32,
    pub keep_alive: i32,
    pub icon_name: String,
    pub icon_background_color: String,
    pub is_ssl: bool,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBroker {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub server: Option<String>,
    pub port: Option<i32>,
    pub keep_alive: Option<i32>,
    pub icon_name: Option<String>,
    pub icon_background_color: Option<String>,
    pub is_ssl: Option<bool>,
    pub client_id: Option<Option<String>>,
    /// Ciphertext; only written through the credentials flow.
    pub username: Option<Option<String>>,
    /// Ciphertext; only written through the credentials flow.
    pub password: Option<Option<String>>,
}

/// Plaintext broker credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrokerCredentials {
    pub id: Uuid,
    pub username: Option<String>,
    pub password: Option<String>,
}
