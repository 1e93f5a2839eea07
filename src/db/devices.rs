use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::*;

use super::row_helpers::map_device_row;

const SELECT_DEVICE: &str = r#"
    SELECT id, name, kind, mac, plan_id, class_id, fabric, role,
           created_at, updated_at
    FROM devices
"#;

/// Generated-device database operations
pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn create(conn: &mut SqliteConnection, req: &CreateDeviceRequest) -> Result<Device> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO devices (name, kind, mac, plan_id, class_id, fabric, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.name)
        .bind(&req.kind)
        .bind(req.mac.clone().unwrap_or_default())
        .bind(req.plan_id)
        .bind(&req.class_id)
        .bind(req.fabric.clone().unwrap_or_default())
        .bind(req.role.clone().unwrap_or_default())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let new_id = result.last_insert_rowid();
        Self::get(conn, new_id)
            .await?
            .context("Device not found after creation")
    }

    pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Option<Device>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_DEVICE))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.as_ref().map(map_device_row))
    }

    pub async fn list_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<Vec<Device>> {
        let rows = sqlx::query(&format!("{} WHERE plan_id = ? ORDER BY name", SELECT_DEVICE))
            .bind(plan_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.iter().map(map_device_row).collect())
    }

    pub async fn count_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices WHERE plan_id = ?")
            .bind(plan_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    /// Remove every device generated for a plan. Links and interfaces must
    /// already be gone; reset order is links, interfaces, devices.
    pub async fn delete_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM devices WHERE plan_id = ?")
            .bind(plan_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
