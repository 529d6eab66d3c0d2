//! Change notifications emitted by resource mutations.
//!
//! Each helper broadcasts to every channel of the owning user. Clients use
//! `entity` and `related` to decide which cached lists to refetch.

use uuid::Uuid;

use dashx_entity::event::{EntityName, Event, EventAction, EventEntity};

use crate::registry::EventRegistry;

impl EventRegistry {
    /// Profile of the user changed.
    pub fn publish_user(&self, action: EventAction, user_id: Uuid) {
        let event = Event::entity(action, EventEntity::new(user_id, EntityName::User));
        self.publish(event, user_id, None);
    }

    pub fn publish_brokers(&self, action: EventAction, user_id: Uuid, broker_id: Uuid) {
        let event = Event::entity(action, EventEntity::new(broker_id, EntityName::Brokers));
        self.publish(event, user_id, None);
    }

    /// A device changed; its broker, if any, is listed as related.
    pub fn publish_devices(
        &self,
        action: EventAction,
        user_id: Uuid,
        broker_id: Option<Uuid>,
        device_id: Uuid,
    ) {
        let related = broker_id
            .map(|id| EventEntity::new(id, EntityName::Brokers))
            .into_iter()
            .collect();
        let event = Event::entity(action, EventEntity::new(device_id, EntityName::Devices))
            .with_related(related);
        self.publish(event, user_id, None);
    }

    /// A control of a device changed. The entity carries the device id, so
    /// clients refetch that device's control list.
    pub fn publish_device_controls(
        &self,
        action: EventAction,
        user_id: Uuid,
        broker_id: Option<Uuid>,
        device_id: Uuid,
    ) {
        let mut related = vec![EventEntity::new(device_id, EntityName::Devices)];
        if let Some(broker_id) = broker_id {
            related.push(EventEntity::new(broker_id, EntityName::Brokers));
        }
        let event = Event::entity(
            action,
            EventEntity::new(device_id, EntityName::DeviceControls),
        )
        .with_related(related);
        self.publish(event, user_id, None);
    }

    /// Ask one event stream to close itself (logout from that client).
    pub fn close_channel(&self, user_id: Uuid, channel_id: Uuid) {
        self.publish(
            Event::signal(EventAction::ChannelClosed),
            user_id,
            Some(channel_id),
        );
    }
}
