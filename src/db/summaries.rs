use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::*;

use super::row_helpers::map_summary_row;

const SELECT_SUMMARY: &str = r#"
    SELECT id, plan_id, status, device_count, interface_count, link_count,
           snapshot, created_at
    FROM generation_summaries
"#;

/// Generation-summary database operations
pub struct SummaryRepo;

impl SummaryRepo {
    pub async fn get(
        conn: &mut SqliteConnection,
        plan_id: i64,
    ) -> Result<Option<GenerationSummary>> {
        let row = sqlx::query(&format!("{} WHERE plan_id = ?", SELECT_SUMMARY))
            .bind(plan_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.as_ref().map(map_summary_row))
    }

    /// Replace the summary for a plan — the prior row is removed, never
    /// merged.
    pub async fn replace(
        conn: &mut SqliteConnection,
        summary: &NewSummary,
    ) -> Result<GenerationSummary> {
        sqlx::query("DELETE FROM generation_summaries WHERE plan_id = ?")
            .bind(summary.plan_id)
            .execute(&mut *conn)
            .await?;

        let now = Utc::now();
        let snapshot = serde_json::to_string(&summary.snapshot)?;
        sqlx::query(
            r#"
            INSERT INTO generation_summaries
                (plan_id, status, device_count, interface_count, link_count, snapshot, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(summary.plan_id)
        .bind(&summary.status)
        .bind(summary.device_count)
        .bind(summary.interface_count)
        .bind(summary.link_count)
        .bind(&snapshot)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Self::get(conn, summary.plan_id)
            .await?
            .context("Summary not found after replace")
    }
}
