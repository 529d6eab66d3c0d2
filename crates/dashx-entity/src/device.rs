//! Devices grouped on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    pub user_id: Uuid,
    pub broker_id: Option<Uuid>,
    pub name: String,
    pub icon_name: String,
    pub icon_background_color: String,
    pub placing: Option<String>,
    pub base_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDevice {
    pub user_id: Uuid,
    pub broker_id: Option<Uuid>,
    pub name: String,
    pub icon_name: String,
    pub icon_background_color: String,
    pub placing: Option<String>,
    pub base_path: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDevice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub broker_id: Option<Option<Uuid>>,
    pub name: Option<String>,
    pub icon_name: Option<String>,
    pub icon_background_color: Option<String>,
    pub placing: Option<Option<String>>,
    pub base_path: Option<Option<String>>,
}

/// Filters for listing a user's devices.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub user_id: Uuid,
    pub broker_id: Option<Uuid>,
}
