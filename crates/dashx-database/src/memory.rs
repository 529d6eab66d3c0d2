//! In-process repository implementations.
//!
//! They mirror the not-found and uniqueness behavior of the `Pg*`
//! repositories and back the service and router tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::types::Json;
use uuid::Uuid;

use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_entity::broker::{Broker, CreateBroker, UpdateBroker};
use dashx_entity::device::{CreateDevice, Device, DeviceFilter, UpdateDevice};
use dashx_entity::device_control::{
    ControlType, CreateDeviceControl, DeviceControl, UpdateDeviceControl,
};
use dashx_entity::user::{CreateUser, UpdateUser, User};

use crate::repositories::{
    BrokerRepository, DeviceControlRepository, DeviceRepository, UserRepository,
};

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: DashMap<Uuid, User>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get(&self, id: Uuid) -> AppResult<User> {
        self.users
            .get(&id)
            .map(|u| u.value().clone())
            .ok_or_else(AppError::user_not_found)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| u.value().clone())
            .ok_or_else(AppError::user_not_found)
    }

    async fn create(&self, user: CreateUser) -> AppResult<Uuid> {
        if self.email_taken(&user.email, None) {
            return Err(AppError::email_exists());
        }
        let id = Uuid::new_v4();
        self.users.insert(
            id,
            User {
                id,
                name: user.name,
                email: user.email,
                password: user.password,
                is_admin: user.is_admin,
                language: user.language.unwrap_or_else(|| "en".into()),
                theme: user.theme.unwrap_or_else(|| "light".into()),
            },
        );
        Ok(id)
    }

    async fn update(&self, user: UpdateUser) -> AppResult<()> {
        let email_taken = user
            .email
            .as_deref()
            .is_some_and(|email| self.email_taken(email, Some(user.id)));
        if email_taken {
            return Err(AppError::email_exists());
        }
        let mut row = self
            .users
            .get_mut(&user.id)
            .ok_or_else(AppError::user_not_found)?;
        if let Some(name) = user.name {
            row.name = name;
        }
        if let Some(email) = user.email {
            row.email = email;
        }
        if let Some(password) = user.password {
            row.password = password;
        }
        if let Some(language) = user.language {
            row.language = language;
        }
        if let Some(theme) = user.theme {
            row.theme = theme;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(AppError::user_not_found)
    }
}

#[derive(Debug, Default)]
pub struct MemoryBrokerRepository {
    brokers: DashMap<Uuid, Broker>,
}

impl MemoryBrokerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BrokerRepository for MemoryBrokerRepository {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Broker>> {
        let mut brokers: Vec<Broker> = self
            .brokers
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.value().clone())
            .collect();
        brokers.sort_by_key(|b| b.created_at);
        Ok(brokers)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Broker> {
        self.brokers
            .get(&id)
            .filter(|b| b.user_id == user_id)
            .map(|b| b.value().clone())
            .ok_or_else(AppError::broker_not_found)
    }

    async fn create(&self, broker: CreateBroker) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.brokers.insert(
            id,
            Broker {
                id,
                user_id: broker.user_id,
                name: broker.name,
                server: broker.server,
                port: broker.port,
                keep_alive: broker.keep_alive,
                icon_name: broker.icon_name,
                icon_background_color: broker.icon_background_color,
                is_ssl: broker.is_ssl,
                username: None,
                password: None,
                client_id: broker.client_id,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update(&self, broker: UpdateBroker) -> AppResult<()> {
        let mut row = self
            .brokers
            .get_mut(&broker.id)
            .filter(|b| b.user_id == broker.user_id)
            .ok_or_else(AppError::broker_not_found)?;
        if let Some(name) = broker.name {
            row.name = name;
        }
        if let Some(server) = broker.server {
            row.server = server;
        }
        if let Some(port) = broker.port {
            row.port = port;
        }
        if let Some(keep_alive) = broker.keep_alive {
            row.keep_alive = keep_alive;
        }
        if let Some(icon_name) = broker.icon_name {
            row.icon_name = icon_name;
        }
        if let Some(color) = broker.icon_background_color {
            row.icon_background_color = color;
        }
        if let Some(is_ssl) = broker.is_ssl {
            row.is_ssl = is_ssl;
        }
        if let Some(client_id) = broker.client_id {
            row.client_id = client_id;
        }
        if let Some(username) = broker.username {
            row.username = username;
        }
        if let Some(password) = broker.password {
            row.password = password;
        }
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.brokers
            .remove_if(&id, |_, b| b.user_id == user_id)
            .map(|_| ())
            .ok_or_else(AppError::broker_not_found)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDeviceRepository {
    devices: DashMap<Uuid, Device>,
}

impl MemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRepository for MemoryDeviceRepository {
    async fn list(&self, filter: DeviceFilter) -> AppResult<Vec<Device>> {
        let mut devices: Vec<Device> = self
            .devices
            .iter()
            .filter(|d| d.user_id == filter.user_id)
            .filter(|d| filter.broker_id.is_none() || d.broker_id == filter.broker_id)
            .map(|d| d.value().clone())
            .collect();
        devices.sort_by_key(|d| d.created_at);
        Ok(devices)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Device> {
        self.devices
            .get(&id)
            .filter(|d| d.user_id == user_id)
            .map(|d| d.value().clone())
            .ok_or_else(AppError::device_not_found)
    }

    async fn create(&self, device: CreateDevice) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.devices.insert(
            id,
            Device {
                id,
                user_id: device.user_id,
                broker_id: device.broker_id,
                name: device.name,
                icon_name: device.icon_name,
                icon_background_color: device.icon_background_color,
                placing: device.placing,
                base_path: device.base_path,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update(&self, device: UpdateDevice) -> AppResult<()> {
        let mut row = self
            .devices
            .get_mut(&device.id)
            .filter(|d| d.user_id == device.user_id)
            .ok_or_else(AppError::device_not_found)?;
        if let Some(broker_id) = device.broker_id {
            row.broker_id = broker_id;
        }
        if let Some(name) = device.name {
            row.name = name;
        }
        if let Some(icon_name) = device.icon_name {
            row.icon_name = icon_name;
        }
        if let Some(color) = device.icon_background_color {
            row.icon_background_color = color;
        }
        if let Some(placing) = device.placing {
            row.placing = placing;
        }
        if let Some(base_path) = device.base_path {
            row.base_path = base_path;
        }
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.devices
            .remove_if(&id, |_, d| d.user_id == user_id)
            .map(|_| ())
            .ok_or_else(AppError::device_not_found)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDeviceControlRepository {
    controls: DashMap<Uuid, DeviceControl>,
}

impl MemoryDeviceControlRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceControlRepository for MemoryDeviceControlRepository {
    async fn list(&self, device_id: Uuid) -> AppResult<Vec<DeviceControl>> {
        let mut controls: Vec<DeviceControl> = self
            .controls
            .iter()
            .filter(|c| c.device_id == device_id)
            .map(|c| c.value().clone())
            .collect();
        controls.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(controls)
    }

    async fn get(&self, id: Uuid, device_id: Uuid) -> AppResult<DeviceControl> {
        self.controls
            .get(&id)
            .filter(|c| c.device_id == device_id)
            .map(|c| c.value().clone())
            .ok_or_else(AppError::control_not_found)
    }

    async fn exists_with_type(
        &self,
        device_id: Uuid,
        control_type: ControlType,
        except: Option<Uuid>,
    ) -> AppResult<bool> {
        Ok(self.controls.iter().any(|c| {
            c.device_id == device_id && c.control_type == control_type && Some(c.id) != except
        }))
    }

    async fn create(&self, control: CreateDeviceControl) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        self.controls.insert(
            id,
            DeviceControl {
                id,
                device_id: control.device_id,
                name: control.name,
                control_type: control.control_type,
                quality_of_service: control.quality_of_service,
                icon_name: control.icon_name,
                icon_background_color: control.icon_background_color,
                is_available: control.is_available,
                is_confirmation_required: control.is_confirmation_required,
                can_notify_on_publish: control.can_notify_on_publish,
                can_display_name: control.can_display_name,
                topic: control.topic,
                attributes: Json(control.attributes),
            },
        );
        Ok(id)
    }

    async fn update(&self, control: UpdateDeviceControl) -> AppResult<()> {
        let mut row = self
            .controls
            .get_mut(&control.id)
            .filter(|c| c.device_id == control.device_id)
            .ok_or_else(AppError::control_not_found)?;
        if let Some(name) = control.name {
            row.name = name;
        }
        if let Some(control_type) = control.control_type {
            row.control_type = control_type;
        }
        if let Some(qos) = control.quality_of_service {
            row.quality_of_service = qos;
        }
        if let Some(icon_name) = control.icon_name {
            row.icon_name = icon_name;
        }
        if let Some(color) = control.icon_background_color {
            row.icon_background_color = color;
        }
        if let Some(v) = control.is_available {
            row.is_available = v;
        }
        if let Some(v) = control.is_confirmation_required {
            row.is_confirmation_required = v;
        }
        if let Some(v) = control.can_notify_on_publish {
            row.can_notify_on_publish = v;
        }
        if let Some(v) = control.can_display_name {
            row.can_display_name = v;
        }
        if let Some(topic) = control.topic {
            row.topic = topic;
        }
        if let Some(attributes) = control.attributes {
            row.attributes = Json(attributes);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, device_id: Uuid) -> AppResult<()> {
        self.controls
            .remove_if(&id, |_, c| c.device_id == device_id)
            .map(|_| ())
            .ok_or_else(AppError::control_not_found)
    }
}
