use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NamingTemplate;

/// Canonical generation status values
pub mod generation_status {
    pub const GENERATED: &str = "generated";
    pub const IN_PROGRESS: &str = "in-progress";
    pub const FAILED: &str = "failed";
}

/// Canonical device kind values
pub mod device_kind {
    pub const SWITCH: &str = "switch";
    pub const SERVER: &str = "server";
}

/// Device represents one generated switch or server instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub kind: String, // switch, server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    pub plan_id: i64,
    pub class_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fabric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// CreateDeviceRequest for creating generated devices
#[derive(Debug, Clone)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub kind: String,
    pub mac: Option<String>,
    pub plan_id: i64,
    pub class_id: String,
    pub fabric: Option<String>,
    pub role: Option<String>,
}

/// Interface represents a named port on a device, typed by speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub id: i64,
    pub device_id: i64,
    pub name: String,
    pub speed_mbps: i64,
    pub plan_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Link represents one cable between exactly two interfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub a_interface_id: i64,
    pub b_interface_id: i64,
    pub plan_id: i64,
    pub created_at: DateTime<Utc>,
}

/// GenerationSummary is the persisted outcome of one generation run; fully
/// replaced, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub id: i64,
    pub plan_id: i64,
    pub status: String, // generated, in-progress, failed
    pub device_count: i64,
    pub interface_count: i64,
    pub link_count: i64,
    pub snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// NewSummary carries the fields written when a summary row is replaced
#[derive(Debug, Clone)]
pub struct NewSummary {
    pub plan_id: i64,
    pub status: String,
    pub device_count: i64,
    pub interface_count: i64,
    pub link_count: i64,
    pub snapshot: serde_json::Value,
}

/// Global settings stored as one JSON row; the naming templates here are the
/// defaults consulted after plan-scoped ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub naming_templates: Vec<NamingTemplate>,
}
