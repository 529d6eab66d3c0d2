//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use dashx_core::error::AppError;
use dashx_entity::broker::{BrokerCredentials, CreateBroker, UpdateBroker};
use dashx_entity::device::{CreateDevice, UpdateDevice};
use dashx_entity::device_control::{
    ControlAttributes, ControlType, CreateDeviceControl, QosLevel, UpdateDeviceControl,
};
use dashx_entity::user::UpdateUser;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Pair with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Users ──────────────────────────────────────────────────────

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Body carrying only an email (confirm resend, reset request).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email)]
    pub email: String,
}

/// Profile update. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub theme: Option<String>,
    pub language: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_update(self, id: Uuid) -> UpdateUser {
        UpdateUser {
            id,
            name: self.name,
            email: self.email,
            password: None,
            language: self.language,
            theme: self.theme,
        }
    }
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// A single password (account deletion, reset completion).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordRequest {
    #[validate(length(min = 6))]
    pub password: String,
}

// ── Icons ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub background_color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconUpdate {
    pub name: Option<String>,
    pub background_color: Option<String>,
}

// ── Brokers ────────────────────────────────────────────────────

/// New broker. Credentials are set through their own endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrokerRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub server: String,
    pub port: u16,
    pub keep_alive: u16,
    #[validate(nested)]
    pub icon: Icon,
    pub is_ssl: bool,
    pub client_id: Option<String>,
}

impl CreateBrokerRequest {
    pub fn into_create(self, user_id: Uuid) -> CreateBroker {
        CreateBroker {
            user_id,
            name: self.name,
            server: self.server,
            port: i32::from(self.port),
            keep_alive: i32::from(self.keep_alive),
            icon_name: self.icon.name,
            icon_background_color: self.icon.background_color,
            is_ssl: self.is_ssl,
            client_id: self.client_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrokerRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub server: Option<String>,
    pub port: Option<u16>,
    pub keep_alive: Option<u16>,
    #[serde(default)]
    pub icon: IconUpdate,
    pub is_ssl: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub client_id: Option<Option<String>>,
}

impl UpdateBrokerRequest {
    pub fn into_update(self, id: Uuid, user_id: Uuid) -> UpdateBroker {
        UpdateBroker {
            id,
            user_id,
            name: self.name,
            server: self.server,
            port: self.port.map(i32::from),
            keep_alive: self.keep_alive.map(i32::from),
            icon_name: self.icon.name,
            icon_background_color: self.icon.background_color,
            is_ssl: self.is_ssl,
            client_id: self.client_id,
            username: None,
            password: None,
        }
    }
}

/// Broker credentials. Both fields must be present; `null` clears one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SetCredentialsRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub username: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub password: Option<Option<String>>,
}

impl SetCredentialsRequest {
    pub fn into_credentials(self, id: Uuid) -> Result<BrokerCredentials, AppError> {
        match (self.username, self.password) {
            (Some(username), Some(password)) => Ok(BrokerCredentials {
                id,
                username,
                password,
            }),
            _ => Err(AppError::no_broker_credentials()),
        }
    }
}

// ── Devices ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub broker_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(nested)]
    pub icon: Icon,
    pub placing: Option<String>,
    pub base_path: Option<String>,
}

impl CreateDeviceRequest {
    pub fn into_create(self, user_id: Uuid) -> CreateDevice {
        CreateDevice {
            user_id,
            broker_id: self.broker_id,
            name: self.name,
            icon_name: self.icon.name,
            icon_background_color: self.icon.background_color,
            placing: self.placing,
            base_path: self.base_path,
        }
    }
}

/// Device update. `brokerId`, `placing` and `basePath` accept `null` to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub broker_id: Option<Option<Uuid>>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: IconUpdate,
    #[serde(default, deserialize_with = "double_option")]
    pub placing: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub base_path: Option<Option<String>>,
}

impl UpdateDeviceRequest {
    pub fn into_update(self, id: Uuid, user_id: Uuid) -> UpdateDevice {
        UpdateDevice {
            id,
            user_id,
            broker_id: self.broker_id,
            name: self.name,
            icon_name: self.icon.name,
            icon_background_color: self.icon.background_color,
            placing: self.placing,
            base_path: self.base_path,
        }
    }
}

/// `GET /devices` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceQuery {
    pub broker_id: Option<Uuid>,
}

// ── Device controls ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateControlRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    pub control_type: ControlType,
    #[serde(default)]
    pub attributes: ControlAttributes,
    #[validate(length(min = 1))]
    pub topic: String,
    #[validate(nested)]
    pub icon: Icon,
    #[serde(default)]
    pub quality_of_service: QosLevel,
    pub is_confirmation_required: bool,
    pub is_available: bool,
    pub can_notify_on_publish: bool,
    pub can_display_name: bool,
}

impl CreateControlRequest {
    pub fn into_create(self, device_id: Uuid) -> CreateDeviceControl {
        CreateDeviceControl {
            device_id,
            name: self.name,
            control_type: self.control_type,
            quality_of_service: self.quality_of_service,
            icon_name: self.icon.name,
            icon_background_color: self.icon.background_color,
            is_available: self.is_available,
            is_confirmation_required: self.is_confirmation_required,
            can_notify_on_publish: self.can_notify_on_publish,
            can_display_name: self.can_display_name,
            topic: self.topic,
            attributes: self.attributes,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateControlRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub control_type: Option<ControlType>,
    pub attributes: Option<ControlAttributes>,
    #[validate(length(min = 1))]
    pub topic: Option<String>,
    #[serde(default)]
    pub icon: IconUpdate,
    pub quality_of_service: Option<QosLevel>,
    pub is_confirmation_required: Option<bool>,
    pub is_available: Option<bool>,
    pub can_notify_on_publish: Option<bool>,
    pub can_display_name: Option<bool>,
}

impl UpdateControlRequest {
    pub fn into_update(self, id: Uuid, device_id: Uuid) -> UpdateDeviceControl {
        UpdateDeviceControl {
            id,
            device_id,
            name: self.name,
            control_type: self.control_type,
            quality_of_service: self.quality_of_service,
            icon_name: self.icon.name,
            icon_background_color: self.icon.background_color,
            is_available: self.is_available,
            is_confirmation_required: self.is_confirmation_required,
            can_notify_on_publish: self.can_notify_on_publish,
            can_display_name: self.can_display_name,
            topic: self.topic,
            attributes: self.attributes,
        }
    }
}
