//! Controls rendered on a device card: buttons, sliders, switches and friends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Kind of widget a control renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "control_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ControlType {
    Button,
    Color,
    DateTime,
    Radio,
    Slider,
    State,
    Switch,
    TextOut,
}

/// MQTT quality-of-service level. Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "qos_level")]
#[serde(try_from = "u8", into = "u8")]
pub enum QosLevel {
    #[default]
    #[sqlx(rename = "0")]
    AtMostOnce,
    #[sqlx(rename = "1")]
    AtLeastOnce,
    #[sqlx(rename = "2")]
    ExactlyOnce,
}

impl TryFrom<u8> for QosLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            other => Err(format!("invalid quality of service level: {other}")),
        }
    }
}

impl From<QosLevel> for u8 {
    fn from(level: QosLevel) -> Self {
        match level {
            QosLevel::AtMostOnce => 0,
            QosLevel::AtLeastOnce => 1,
            QosLevel::ExactlyOnce => 2,
        }
    }
}

/// Type-specific widget settings, stored as JSONB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payloads: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_span: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_as_ticks: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceControl {
    pub id: Uuid,
    pub device_id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    pub control_type: ControlType,
    pub quality_of_service: QosLevel,
    pub icon_name: String,
    pub icon_background_color: String,
    pub is_available: bool,
    pub is_confirmation_required: bool,
    pub can_notify_on_publish: bool,
    pub can_display_name: bool,
    pub topic: String,
    pub attributes: Json<ControlAttributes>,
}

#[derive(Debug, Clone)]
pub struct CreateDeviceControl {
    pub device_id: Uuid,
    pub name: String,
    pub control_type: ControlType,
    pub quality_of_service: QosLevel,
    pub icon_name: String,
    pub icon_background_color: String,
    pub is_available: bool,
    pub is_confirmation_required: bool,
    pub can_notify_on_publish: bool,
    pub can_display_name: bool,
    pub topic: String,
    pub attributes: ControlAttributes,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDeviceControl {
    pub id: Uuid,
    pub device_id: Uuid,
    pub name: Option<String>,
    pub control_type: Option<ControlType>,
    pub quality_of_service: Option<QosLevel>,
    pub icon_name: Option<String>,
    pub icon_background_color: Option<String>,
    pub is_available: Option<bool>,
    pub is_confirmation_required: Option<bool>,
    pub can_notify_on_publish: Option<bool>,
    pub can_display_name: Option<bool>,
    pub topic: Option<String>,
    pub attributes: Option<ControlAttributes>,
}
