use sqlx::{sqlite::SqliteRow, Row};

use crate::models::*;

/// Filter empty strings to None — used when DB stores '' instead of NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Map a SQLite row to a Device struct
pub fn map_device_row(row: &SqliteRow) -> Device {
    Device {
        id: row.get("id"),
        name: row.get("name"),
        kind: row.get("kind"),
        mac: none_if_empty(row.get("mac")),
        plan_id: row.get("plan_id"),
        class_id: row.get("class_id"),
        fabric: none_if_empty(row.get("fabric")),
        role: none_if_empty(row.get("role")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to an Interface struct
pub fn map_interface_row(row: &SqliteRow) -> Interface {
    Interface {
        id: row.get("id"),
        device_id: row.get("device_id"),
        name: row.get("name"),
        speed_mbps: row.get("speed_mbps"),
        plan_id: row.get("plan_id"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to a Link struct
pub fn map_link_row(row: &SqliteRow) -> Link {
    Link {
        id: row.get("id"),
        a_interface_id: row.get("a_interface_id"),
        b_interface_id: row.get("b_interface_id"),
        plan_id: row.get("plan_id"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to a GenerationSummary struct
pub fn map_summary_row(row: &SqliteRow) -> GenerationSummary {
    let snapshot_json: String = row.get("snapshot");
    let snapshot = serde_json::from_str(&snapshot_json).unwrap_or_default();
    GenerationSummary {
        id: row.get("id"),
        plan_id: row.get("plan_id"),
        status: row.get("status"),
        device_count: row.get("device_count"),
        interface_count: row.get("interface_count"),
        link_count: row.get("link_count"),
        snapshot,
        created_at: row.get("created_at"),
    }
}
