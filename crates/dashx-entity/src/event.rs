//! Change notifications pushed to connected clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    ChannelOpened,
    ChannelClosed,
    EntityCreated,
    EntityUpdated,
    EntityDeleted,
}

impl EventAction {
    /// Name used as the SSE `event:` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChannelOpened => "CHANNEL_OPENED",
            Self::ChannelClosed => "CHANNEL_CLOSED",
            Self::EntityCreated => "ENTITY_CREATED",
            Self::EntityUpdated => "ENTITY_UPDATED",
            Self::EntityDeleted => "ENTITY_DELETED",
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource family an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityName {
    User,
    Brokers,
    Devices,
    DeviceControls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntity {
    pub id: Uuid,
    pub name: EntityName,
}

impl EventEntity {
    pub fn new(id: Uuid, name: EntityName) -> Self {
        Self { id, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    pub action: EventAction,
    pub entity: Option<EventEntity>,
    pub related: Option<Vec<EventEntity>>,
}

/// A single notification. Serializes as
/// `{"id": .., "data": {"action": .., "entity": .., "related": ..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub data: EventData,
}

impl Event {
    /// Event without an entity, used for channel lifecycle signals.
    pub fn signal(action: EventAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            data: EventData {
                action,
                entity: None,
                related: None,
            },
        }
    }

    pub fn entity(action: EventAction, entity: EventEntity) -> Self {
        Self {
            id: Uuid::new_v4(),
            data: EventData {
                action,
                entity: Some(entity),
                related: None,
            },
        }
    }

    pub fn with_related(mut self, related: Vec<EventEntity>) -> Self {
        self.data.related = Some(related);
        self
    }

    pub fn action(&self) -> EventAction {
        self.data.action
    }
}
