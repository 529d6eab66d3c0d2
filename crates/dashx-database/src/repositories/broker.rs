//! Broker profile persistence.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_entity::broker::{Broker, CreateBroker, UpdateBroker};

use super::db_err;

/// Broker profiles, always scoped to their owner.
#[async_trait]
pub trait BrokerRepository: Send + Sync + 'static {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Broker>>;

    /// Fails with [`AppError::broker_not_found`] when the broker is missing
    /// or owned by someone else.
    async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Broker>;

    async fn create(&self, broker: CreateBroker) -> AppResult<Uuid>;

    async fn update(&self, broker: UpdateBroker) -> AppResult<()>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct PgBrokerRepository {
    pool: PgPool,
}

impl PgBrokerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BrokerRepository for PgBrokerRepository {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Broker>> {
        sqlx::query_as::<_, Broker>(
            "SELECT * FROM brokers WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list brokers"))
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Broker> {
        sqlx::query_as::<_, Broker>("SELECT * FROM brokers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find broker"))?
            .ok_or_else(AppError::broker_not_found)
    }

    async fn create(&self, broker: CreateBroker) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO brokers \
             (user_id, name, server, port, keep_alive, icon_name, icon_background_color, is_ssl, client_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
        )
        .bind(broker.user_id)
        .bind(&broker.name)
        .bind(&broker.server)
        .bind(broker.port)
        .bind(broker.keep_alive)
        .bind(&broker.icon_name)
        .bind(&broker.icon_background_color)
        .bind(broker.is_ssl)
        .bind(&broker.client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create broker"))
    }

    async fn update(&self, broker: UpdateBroker) -> AppResult<()> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE brokers SET updated_at = NOW()");
        if let Some(name) = broker.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(server) = broker.server {
            qb.push(", server = ").push_bind(server);
        }
        if let Some(port) = broker.port {
            qb.push(", port = ").push_bind(port);
        }
        if let Some(keep_alive) = broker.keep_alive {
            qb.push(", keep_alive = ").push_bind(keep_alive);
        }
        if let Some(icon_name) = broker.icon_name {
            qb.push(", icon_name = ").push_bind(icon_name);
        }
        if let Some(color) = broker.icon_background_color {
            qb.push(", icon_background_color = ").push_bind(color);
        }
        if let Some(is_ssl) = broker.is_ssl {
            qb.push(", is_ssl = ").push_bind(is_ssl);
        }
        if let Some(client_id) = broker.client_id {
            qb.push(", client_id = ").push_bind(client_id);
        }
        if let Some(username) = broker.username {
            qb.push(", username = ").push_bind(username);
        }
        if let Some(password) = broker.password {
            qb.push(", password = ").push_bind(password);
        }
        qb.push(" WHERE id = ")
            .push_bind(broker.id)
            .push(" AND user_id = ")
            .push_bind(broker.user_id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to update broker"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::broker_not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM brokers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete broker"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::broker_not_found());
        }
        Ok(())
    }
}
