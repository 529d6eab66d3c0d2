//! Device persistence.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_entity::device::{CreateDevice, Device, DeviceFilter, UpdateDevice};

use super::db_err;

#[async_trait]
pub trait DeviceRepository: Send + Sync + 'static {
    async fn list(&self, filter: DeviceFilter) -> AppResult<Vec<Device>>;

    /// Fails with [`AppError::device_not_found`] when the device is missing
    /// or owned by someone else.
    async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Device>;

    async fn create(&self, device: CreateDevice) -> AppResult<Uuid>;

    async fn update(&self, device: UpdateDevice) -> AppResult<()>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct PgDeviceRepository {
    pool: PgPool,
}

impl PgDeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn list(&self, filter: DeviceFilter) -> AppResult<Vec<Device>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM devices WHERE user_id = ");
        qb.push_bind(filter.user_id);
        if let Some(broker_id) = filter.broker_id {
            qb.push(" AND broker_id = ").push_bind(broker_id);
        }
        qb.push(" ORDER BY created_at");

        qb.build_query_as::<Device>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list devices"))
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Device> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find device"))?
            .ok_or_else(AppError::device_not_found)
    }

    async fn create(&self, device: CreateDevice) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO devices \
             (user_id, broker_id, name, icon_name, icon_background_color, placing, base_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(device.user_id)
        .bind(device.broker_id)
        .bind(&device.name)
        .bind(&device.icon_name)
        .bind(&device.icon_background_color)
        .bind(&device.placing)
        .bind(&device.base_path)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create device"))
    }

    async fn update(&self, device: UpdateDevice) -> AppResult<()> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE devices SET updated_at = NOW()");
        if let Some(broker_id) = device.broker_id {
            qb.push(", broker_id = ").push_bind(broker_id);
        }
        if let Some(name) = device.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(icon_name) = device.icon_name {
            qb.push(", icon_name = ").push_bind(icon_name);
        }
        if let Some(color) = device.icon_background_color {
            qb.push(", icon_background_color = ").push_bind(color);
        }
        if let Some(placing) = device.placing {
            qb.push(", placing = ").push_bind(placing);
        }
        if let Some(base_path) = device.base_path {
            qb.push(", base_path = ").push_bind(base_path);
        }
        qb.push(" WHERE id = ")
            .push_bind(device.id)
            .push(" AND user_id = ")
            .push_bind(device.user_id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to update device"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::device_not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete device"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::device_not_found());
        }
        Ok(())
    }
}
