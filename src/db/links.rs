use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::*;

use super::row_helpers::map_link_row;

const SELECT_LINK: &str = r#"
    SELECT id, a_interface_id, b_interface_id, plan_id, created_at
    FROM links
"#;

/// Generated-link database operations
pub struct LinkRepo;

impl LinkRepo {
    pub async fn create(
        conn: &mut SqliteConnection,
        a_interface_id: i64,
        b_interface_id: i64,
        plan_id: i64,
    ) -> Result<Link> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO links (a_interface_id, b_interface_id, plan_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(a_interface_id)
        .bind(b_interface_id)
        .bind(plan_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let new_id = result.last_insert_rowid();
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_LINK))
            .bind(new_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref()
            .map(map_link_row)
            .context("Link not found after creation")
    }

    pub async fn list_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<Vec<Link>> {
        let rows = sqlx::query(&format!("{} WHERE plan_id = ? ORDER BY id", SELECT_LINK))
            .bind(plan_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.iter().map(map_link_row).collect())
    }

    pub async fn count_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM links WHERE plan_id = ?")
            .bind(plan_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    /// Remove every link generated for a plan. Runs first in a reset so no
    /// interface deletion leaves a dangling termination.
    pub async fn delete_for_plan(conn: &mut SqliteConnection, plan_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM links WHERE plan_id = ?")
            .bind(plan_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
