//! Device controls. Access goes through the owning device.

use std::sync::Arc;

use uuid::Uuid;

use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_database::repositories::{DeviceControlRepository, DeviceRepository};
use dashx_entity::device::Device;
use dashx_entity::device_control::{
    ControlType, CreateDeviceControl, DeviceControl, UpdateDeviceControl,
};
use dashx_entity::event::EventAction;
use dashx_realtime::EventRegistry;

/// Manages controls of devices owned by the caller.
///
/// A device carries at most one `state` control.
#[derive(Clone)]
pub struct DeviceControlService {
    controls: Arc<dyn DeviceControlRepository>,
    devices: Arc<dyn DeviceRepository>,
    events: EventRegistry,
}

impl DeviceControlService {
    pub fn new(
        controls: Arc<dyn DeviceControlRepository>,
        devices: Arc<dyn DeviceRepository>,
        events: EventRegistry,
    ) -> Self {
        Self {
            controls,
            devices,
            events,
        }
    }

    async fn owned_device(&self, device_id: Uuid, user_id: Uuid) -> AppResult<Device> {
        self.devices.get(device_id, user_id).await
    }

    async fn ensure_single_state(&self, device_id: Uuid, except: Option<Uuid>) -> AppResult<()> {
        if self
            .controls
            .exists_with_type(device_id, ControlType::State, except)
            .await?
        {
            return Err(AppError::control_state_exists());
        }
        Ok(())
    }

    fn publish(&self, action: EventAction, user_id: Uuid, device: &Device) {
        self.events
            .publish_device_controls(action, user_id, device.broker_id, device.id);
    }

    pub async fn list(&self, user_id: Uuid, device_id: Uuid) -> AppResult<Vec<DeviceControl>> {
        self.owned_device(device_id, user_id).await?;
        self.controls.list(device_id).await
    }

    pub async fn create(&self, user_id: Uuid, control: CreateDeviceControl) -> AppResult<Uuid> {
        let device = self.owned_device(control.device_id, user_id).await?;
        if control.control_type == ControlType::State {
            self.ensure_single_state(device.id, None).await?;
        }

        let id = self.controls.create(control).await?;
        self.publish(EventAction::EntityCreated, user_id, &device);
        Ok(id)
    }

    pub async fn update(&self, user_id: Uuid, control: UpdateDeviceControl) -> AppResult<()> {
        let device = self.owned_device(control.device_id, user_id).await?;
        if control.control_type == Some(ControlType::State) {
            self.ensure_single_state(device.id, Some(control.id)).await?;
        }

        self.controls.update(control).await?;
        self.publish(EventAction::EntityUpdated, user_id, &device);
        Ok(())
    }

    pub async fn delete(&self, user_id: Uuid, device_id: Uuid, control_id: Uuid) -> AppResult<()> {
        let device = self.owned_device(device_id, user_id).await?;
        self.controls.delete(control_id, device_id).await?;
        self.publish(EventAction::EntityDeleted, user_id, &device);
        Ok(())
    }
}
