//! Device CRUD. A device may reference one of its owner's brokers.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use dashx_core::result::AppResult;
use dashx_database::repositories::{BrokerRepository, DeviceRepository};
use dashx_entity::device::{CreateDevice, Device, DeviceFilter, UpdateDevice};
use dashx_entity::event::EventAction;
use dashx_realtime::EventRegistry;

#[derive(Clone)]
pub struct DeviceService {
    devices: Arc<dyn DeviceRepository>,
    brokers: Arc<dyn BrokerRepository>,
    events: EventRegistry,
}

impl DeviceService {
    pub fn new(
        devices: Arc<dyn DeviceRepository>,
        brokers: Arc<dyn BrokerRepository>,
        events: EventRegistry,
    ) -> Self {
        Self {
            devices,
            brokers,
            events,
        }
    }

    pub async fn list(&self, filter: DeviceFilter) -> AppResult<Vec<Device>> {
        self.devices.list(filter).await
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Device> {
        self.devices.get(id, user_id).await
    }

    /// Fails with `broker not found` unless the broker belongs to `user_id`.
    async fn ensure_broker(&self, broker_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.brokers.get(broker_id, user_id).await.map(|_| ())
    }

    pub async fn create(&self, device: CreateDevice) -> AppResult<Uuid> {
        if let Some(broker_id) = device.broker_id {
            self.ensure_broker(broker_id, device.user_id).await?;
        }

        let (user_id, broker_id) = (device.user_id, device.broker_id);
        let id = self.devices.create(device).await?;
        self.events
            .publish_devices(EventAction::EntityCreated, user_id, broker_id, id);

        info!(device_id = %id, %user_id, "Device created");
        Ok(id)
    }

    pub async fn update(&self, device: UpdateDevice) -> AppResult<()> {
        if let Some(Some(broker_id)) = device.broker_id {
            self.ensure_broker(broker_id, device.user_id).await?;
        }

        let (id, user_id) = (device.id, device.user_id);
        self.devices.update(device).await?;

        match self.devices.get(id, user_id).await {
            Ok(updated) => self.events.publish_devices(
                EventAction::EntityUpdated,
                user_id,
                updated.broker_id,
                id,
            ),
            Err(e) => warn!(device_id = %id, error = %e, "Updated device vanished before publish"),
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let device = self.devices.get(id, user_id).await?;
        self.devices.delete(id, user_id).await?;
        self.events
            .publish_devices(EventAction::EntityDeleted, user_id, device.broker_id, id);

        info!(device_id = %id, %user_id, "Device deleted");
        Ok(())
    }
}
