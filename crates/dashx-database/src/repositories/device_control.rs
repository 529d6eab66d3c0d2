//! Device control persistence.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_entity::device_control::{
    ControlType, CreateDeviceControl, DeviceControl, UpdateDeviceControl,
};

use super::db_err;

/// Controls are addressed through their device; ownership of the device is
/// checked by the caller.
#[async_trait]
pub trait DeviceControlRepository: Send + Sync + 'static {
    async fn list(&self, device_id: Uuid) -> AppResult<Vec<DeviceControl>>;

    async fn get(&self, id: Uuid, device_id: Uuid) -> AppResult<DeviceControl>;

    /// Whether the device has a control of the given type, ignoring `except`.
    async fn exists_with_type(
        &self,
        device_id: Uuid,
        control_type: ControlType,
        except: Option<Uuid>,
    ) -> AppResult<bool>;

    async fn create(&self, control: CreateDeviceControl) -> AppResult<Uuid>;

    async fn update(&self, control: UpdateDeviceControl) -> AppResult<()>;

    async fn delete(&self, id: Uuid, device_id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct PgDeviceControlRepository {
    pool: PgPool,
}

impl PgDeviceControlRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceControlRepository for PgDeviceControlRepository {
    async fn list(&self, device_id: Uuid) -> AppResult<Vec<DeviceControl>> {
        sqlx::query_as::<_, DeviceControl>(
            "SELECT * FROM device_controls WHERE device_id = $1 ORDER BY name",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list device controls"))
    }

    async fn get(&self, id: Uuid, device_id: Uuid) -> AppResult<DeviceControl> {
        sqlx::query_as::<_, DeviceControl>(
            "SELECT * FROM device_controls WHERE id = $1 AND device_id = $2",
        )
        .bind(id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find device control"))?
        .ok_or_else(AppError::control_not_found)
    }

    async fn exists_with_type(
        &self,
        device_id: Uuid,
        control_type: ControlType,
        except: Option<Uuid>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM device_controls \
             WHERE device_id = $1 AND type = $2 AND ($3::uuid IS NULL OR id <> $3))",
        )
        .bind(device_id)
        .bind(control_type)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to check device control type"))
    }

    async fn create(&self, control: CreateDeviceControl) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO device_controls \
             (device_id, name, type, quality_of_service, icon_name, icon_background_color, \
              is_available, is_confirmation_required, can_notify_on_publish, can_display_name, \
              topic, attributes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
        )
        .bind(control.device_id)
        .bind(&control.name)
        .bind(control.control_type)
        .bind(control.quality_of_service)
        .bind(&control.icon_name)
        .bind(&control.icon_background_color)
        .bind(control.is_available)
        .bind(control.is_confirmation_required)
        .bind(control.can_notify_on_publish)
        .bind(control.can_display_name)
        .bind(&control.topic)
        .bind(Json(control.attributes))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create device control"))
    }

    async fn update(&self, control: UpdateDeviceControl) -> AppResult<()> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE device_controls SET ");
        let mut set = qb.separated(", ");
        // Keeps the statement valid when no field changes.
        set.push("id = id");
        if let Some(name) = control.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(control_type) = control.control_type {
            set.push("type = ").push_bind_unseparated(control_type);
        }
        if let Some(qos) = control.quality_of_service {
            set.push("quality_of_service = ").push_bind_unseparated(qos);
        }
        if let Some(icon_name) = control.icon_name {
            set.push("icon_name = ").push_bind_unseparated(icon_name);
        }
        if let Some(color) = control.icon_background_color {
            set.push("icon_background_color = ").push_bind_unseparated(color);
        }
        if let Some(v) = control.is_available {
            set.push("is_available = ").push_bind_unseparated(v);
        }
        if let Some(v) = control.is_confirmation_required {
            set.push("is_confirmation_required = ").push_bind_unseparated(v);
        }
        if let Some(v) = control.can_notify_on_publish {
            set.push("can_notify_on_publish = ").push_bind_unseparated(v);
        }
        if let Some(v) = control.can_display_name {
            set.push("can_display_name = ").push_bind_unseparated(v);
        }
        if let Some(topic) = control.topic {
            set.push("topic = ").push_bind_unseparated(topic);
        }
        if let Some(attributes) = control.attributes {
            set.push("attributes = ").push_bind_unseparated(Json(attributes));
        }
        qb.push(" WHERE id = ")
            .push_bind(control.id)
            .push(" AND device_id = ")
            .push_bind(control.device_id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to update device control"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::control_not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, device_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM device_controls WHERE id = $1 AND device_id = $2")
            .bind(id)
            .bind(device_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete device control"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::control_not_found());
        }
        Ok(())
    }
}
