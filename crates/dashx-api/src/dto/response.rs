//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dashx_entity::broker::{Broker, BrokerCredentials};
use dashx_entity::device::Device;
use dashx_entity::device_control::{ControlAttributes, ControlType, DeviceControl, QosLevel};
use dashx_entity::user::User;

use super::request::Icon;

/// Id of a freshly created resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub theme: String,
    pub language: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            theme: user.theme,
            language: user.language,
        }
    }
}

/// Broker without its credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerResponse {
    pub id: Uuid,
    pub name: String,
    pub server: String,
    pub port: i32,
    pub keep_alive: i32,
    pub icon: Icon,
    pub is_ssl: bool,
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Broker> for BrokerResponse {
    fn from(broker: Broker) -> Self {
        Self {
            id: broker.id,
            name: broker.name,
            server: broker.server,
            port: broker.port,
            keep_alive: broker.keep_alive,
            icon: Icon {
                name: broker.icon_name,
                background_color: broker.icon_background_color,
            },
            is_ssl: broker.is_ssl,
            client_id: broker.client_id,
            created_at: broker.created_at,
            updated_at: broker.updated_at,
        }
    }
}

/// Decrypted broker credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsResponse {
    pub id: Uuid,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl From<BrokerCredentials> for CredentialsResponse {
    fn from(creds: BrokerCredentials) -> Self {
        Self {
            id: creds.id,
            username: creds.username,
            password: creds.password,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: Uuid,
    pub broker_id: Option<Uuid>,
    pub name: String,
    pub icon: Icon,
    pub placing: Option<String>,
    pub base_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            broker_id: device.broker_id,
            name: device.name,
            icon: Icon {
                name: device.icon_name,
                background_color: device.icon_background_color,
            },
            placing: device.placing,
            base_path: device.base_path,
            created_at: device.created_at,
            updated_at: device.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    pub id: Uuid,
    pub device_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub control_type: ControlType,
    pub attributes: ControlAttributes,
    pub topic: String,
    pub icon: Icon,
    pub quality_of_service: QosLevel,
    pub is_confirmation_required: bool,
    pub is_available: bool,
    pub can_notify_on_publish: bool,
    pub can_display_name: bool,
}

impl From<DeviceControl> for ControlResponse {
    fn from(control: DeviceControl) -> Self {
        Self {
            id: control.id,
            device_id: control.device_id,
            name: control.name,
            control_type: control.control_type,
            attributes: control.attributes.0,
            topic: control.topic,
            icon: Icon {
                name: control.icon_name,
                background_color: control.icon_background_color,
            },
            quality_of_service: control.quality_of_service,
            is_confirmation_required: control.is_confirmation_required,
            is_available: control.is_available,
            can_notify_on_publish: control.can_notify_on_publish,
            can_display_name: control.can_display_name,
        }
    }
}
