use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::*;

use super::row_helpers::map_interface_row;

const SELECT_INTERFACE: &str = r#"
    SELECT id, device_id, name, speed_mbps, plan_id, created_at
    FROM interfaces
"#;

/// Generated-interface database operations
pub struct InterfaceRepo;

impl InterfaceRepo {
    pub async fn create(
        conn: &mut SqliteConnection,
        device_id: i64,
        name: &str,
        speed_mbps: u32,
        plan_id: i64,
    ) -> Result<Interface> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO interfaces (device_id, name, speed_mbps, plan_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(device_id)
        .bind(name)
        .bind(speed_mbps as i64)
        .bind(plan_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let new_id = result.last_insert_rowid();
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_INTERFACE))
            .bind(new_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref()
            .map(map_interface_row)
            .context("Interface not found after creation")
    }

    pub async fn get_by_name(
        conn: &mut SqliteConnection,
        device_id: i64,
        name: &str,
    ) -> Result<Option<Interface>> {
        let row = sqlx::query(&format!(
            "{} WHERE device_id = ? AND name = ?",
            SELECT_INTERFACE
        ))
        .bind(device_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.as_ref().map(map_interface_row))
    }

    /// Reuse an existing interface by (device, name) or create it. The
    /// existing interface wins wholesale — its declared speed is kept.
    pub async fn get_or_create(
        conn: &mut SqliteConnection,
        device_id: i64,
        name: &str,
        speed_mbps: u32,
        plan_id: i64,
    ) -> Result<Interface> {
        if let Some(existing) = Self::get_by_name(conn, device_id, name).await? {
            return Ok(existing);
        }
        Self::create(conn, device_id, name, speed_mbps, plan_id).await
    }

    pub async fn list_for_device(
        conn: &mut SqliteConnection,
        device_id: i64,
    ) -> Result<Vec<Interface>> {
        let rows = sqlx::query(&format!(
            "{} WHERE device_id = ? ORDER BY name",
            SELECT_INTERFACE
        ))
        .bind(device_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.iter().map(map_interface_row).collect())
    }

    pub async fn count_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM interfaces WHERE plan_id = ?")
            .bind(plan_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    pub async fn delete_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM interfaces WHERE plan_id = ?")
            .bind(plan_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
