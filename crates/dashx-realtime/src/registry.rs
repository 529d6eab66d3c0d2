//! User → channel registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use dashx_entity::event::Event;

/// Cause recorded when a subscription is dropped without an explicit one.
pub const CAUSE_DISCONNECTED: &str = "user disconnected";
/// Cause recorded when a channel ends on a `CHANNEL_CLOSED` event.
pub const CAUSE_LOGGED_OUT: &str = "user logged out";

/// Open channels of one user. The mutex is exclusive to that user.
#[derive(Debug, Default)]
struct UserChannels {
    channels: Mutex<HashMap<Uuid, mpsc::Sender<Event>>>,
}

impl UserChannels {
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<Event>>> {
        // Sends never panic while holding the lock; recover the map regardless.
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[derive(Debug)]
struct RegistryInner {
    users: DashMap<Uuid, Arc<UserChannels>>,
    buffer_size: usize,
}

/// Process-wide registry of event channels, shared by handle.
///
/// Each channel is a bounded buffer. Publishing never blocks: an event that
/// does not fit is dropped for that channel and a warning is logged.
#[derive(Debug, Clone)]
pub struct EventRegistry {
    inner: Arc<RegistryInner>,
}

impl EventRegistry {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                users: DashMap::new(),
                buffer_size: buffer_size.max(1),
            }),
        }
    }

    /// Open a new channel for `user_id`.
    pub fn subscribe(&self, user_id: Uuid) -> Subscription {
        let channel_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.inner.buffer_size);

        // The shard stays locked until the channel is in, so a concurrent
        // cleanup cannot drop the entry in between.
        let entry = self.inner.users.entry(user_id).or_insert_with(|| {
            debug!(%user_id, "Created event channels entry");
            Arc::new(UserChannels::default())
        });
        entry.lock().insert(channel_id, tx);
        drop(entry);

        info!(%user_id, %channel_id, "Event channel opened");

        Subscription {
            user_id,
            channel_id,
            receiver: rx,
            registry: self.clone(),
            cause: CAUSE_DISCONNECTED,
        }
    }

    /// Deliver `event` to one channel of `user_id`, or to all of them when
    /// `channel_id` is `None`. Users without channels are skipped silently.
    pub fn publish(&self, event: Event, user_id: Uuid, channel_id: Option<Uuid>) {
        let Some(user) = self
            .inner
            .users
            .get(&user_id)
            .map(|entry| Arc::clone(entry.value()))
        else {
            debug!(%user_id, action = %event.action(), "No event channels for user");
            return;
        };

        let channels = user.lock();
        match channel_id {
            Some(channel_id) => match channels.get(&channel_id) {
                Some(sender) => deliver(sender, event, user_id, channel_id),
                None => debug!(%user_id, %channel_id, "Event channel not found"),
            },
            None => {
                for (channel_id, sender) in channels.iter() {
                    deliver(sender, event.clone(), user_id, *channel_id);
                }
                debug!(%user_id, action = %event.action(), count = channels.len(), "Broadcast event");
            }
        }
    }

    /// Close a channel and drop the user's entry once it has none left.
    pub fn unsubscribe(&self, user_id: Uuid, channel_id: Uuid, cause: &str) {
        let Some(user) = self
            .inner
            .users
            .get(&user_id)
            .map(|entry| Arc::clone(entry.value()))
        else {
            debug!(%user_id, %channel_id, "No event channels for user");
            return;
        };

        // Removing the sender closes the channel.
        let removed = user.lock().remove(&channel_id).is_some();
        if removed {
            info!(%user_id, %channel_id, cause, "Event channel closed");
        }

        if self
            .inner
            .users
            .remove_if(&user_id, |_, channels| channels.is_empty())
            .is_some()
        {
            debug!(%user_id, "Removed event channels entry, no channels left");
        }
    }

    /// Number of users with at least one open channel.
    pub fn user_count(&self) -> usize {
        self.inner.users.len()
    }

    /// Number of open channels of `user_id`.
    pub fn channel_count(&self, user_id: Uuid) -> usize {
        self.inner
            .users
            .get(&user_id)
            .map(|entry| entry.value().lock().len())
            .unwrap_or(0)
    }
}

fn deliver(sender: &mpsc::Sender<Event>, event: Event, user_id: Uuid, channel_id: Uuid) {
    match sender.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            warn!(
                %user_id,
                %channel_id,
                action = %event.action(),
                "Event channel buffer full, dropping event"
            );
        }
        // Receiver is gone; its subscription is about to unsubscribe.
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}

/// Receiving end of one event channel.
///
/// Dropping it unsubscribes the channel with the recorded cause.
#[derive(Debug)]
pub struct Subscription {
    user_id: Uuid,
    channel_id: Uuid,
    receiver: mpsc::Receiver<Event>,
    registry: EventRegistry,
    cause: &'static str,
}

impl Subscription {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    /// Wait for the next event. `None` once the channel has been closed.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Cause logged when this subscription is dropped.
    pub fn set_cause(&mut self, cause: &'static str) {
        self.cause = cause;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry
            .unsubscribe(self.user_id, self.channel_id, self.cause);
    }
}
