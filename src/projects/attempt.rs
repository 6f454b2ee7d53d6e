use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A learner's in-progress run at a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAttempt {
    pub project_id: u32,
    pub base_points: u32,
    /// `None` when a completion arrives for a project that was never started.
    pub started_at: Option<DateTime<Utc>>,
}

pub fn start_key(project_id: u32) -> String {
    format!("project_{project_id}_start")
}

/// Start times are stored as epoch milliseconds in decimal text.
pub fn encode_started_at(started_at: DateTime<Utc>) -> String {
    started_at.timestamp_millis().to_string()
}

pub fn decode_started_at(raw: &str) -> Result<DateTime<Utc>> {
    let millis: i64 = raw
        .trim()
        .parse()
        .map_err(|err| anyhow!("invalid start timestamp '{raw}': {err}"))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| anyhow!("start timestamp {millis} out of range"))
}
