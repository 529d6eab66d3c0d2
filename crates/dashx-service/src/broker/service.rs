//! Broker CRUD with change events and credential encryption.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use dashx_auth::CryptoService;
use dashx_core::result::AppResult;
use dashx_database::repositories::BrokerRepository;
use dashx_entity::broker::{Broker, BrokerCredentials, CreateBroker, UpdateBroker};
use dashx_entity::event::EventAction;
use dashx_realtime::EventRegistry;

/// Manages a user's brokers. Every mutation is announced on the user's
/// event channels.
#[derive(Clone)]
pub struct BrokerService {
    brokers: Arc<dyn BrokerRepository>,
    crypto: CryptoService,
    events: EventRegistry,
}

impl BrokerService {
    pub fn new(
        brokers: Arc<dyn BrokerRepository>,
        crypto: CryptoService,
        events: EventRegistry,
    ) -> Self {
        Self {
            brokers,
            crypto,
            events,
        }
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Broker>> {
        self.brokers.list(user_id).await
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Broker> {
        self.brokers.get(id, user_id).await
    }

    pub async fn create(&self, broker: CreateBroker) -> AppResult<Uuid> {
        let user_id = broker.user_id;
        let id = self.brokers.create(broker).await?;
        self.events
            .publish_brokers(EventAction::EntityCreated, user_id, id);

        info!(broker_id = %id, %user_id, "Broker created");
        Ok(id)
    }

    /// Update profile fields. Credentials only change through
    /// [`BrokerService::set_credentials`].
    pub async fn update(&self, mut broker: UpdateBroker) -> AppResult<()> {
        if broker.username.is_some() || broker.password.is_some() {
            warn!(broker_id = %broker.id, "Ignoring credentials passed to a broker update");
            broker.username = None;
            broker.password = None;
        }

        let (id, user_id) = (broker.id, broker.user_id);
        self.brokers.update(broker).await?;
        self.events
            .publish_brokers(EventAction::EntityUpdated, user_id, id);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.brokers.delete(id, user_id).await?;
        self.events
            .publish_brokers(EventAction::EntityDeleted, user_id, id);

        info!(broker_id = %id, %user_id, "Broker deleted");
        Ok(())
    }

    /// Decrypted username and password of a broker.
    pub async fn get_credentials(&self, id: Uuid, user_id: Uuid) -> AppResult<BrokerCredentials> {
        let broker = self.brokers.get(id, user_id).await?;
        Ok(BrokerCredentials {
            id,
            username: self.decrypt(broker.username)?,
            password: self.decrypt(broker.password)?,
        })
    }

    /// Replace both credentials. `None` clears a field.
    pub async fn set_credentials(
        &self,
        user_id: Uuid,
        credentials: BrokerCredentials,
    ) -> AppResult<()> {
        let update = UpdateBroker {
            id: credentials.id,
            user_id,
            username: Some(self.encrypt(credentials.username)?),
            password: Some(self.encrypt(credentials.password)?),
            ..Default::default()
        };

        self.brokers.update(update).await?;
        self.events
            .publish_brokers(EventAction::EntityUpdated, user_id, credentials.id);
        Ok(())
    }

    fn encrypt(&self, value: Option<String>) -> AppResult<Option<String>> {
        value.map(|v| self.crypto.encrypt(&v)).transpose()
    }

    fn decrypt(&self, value: Option<String>) -> AppResult<Option<String>> {
        value.map(|v| self.crypto.decrypt(&v)).transpose()
    }
}
