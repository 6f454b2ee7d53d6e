use chrono::Utc;
use serde::Serialize;

use crate::{
    capture::MediaDevice,
    notify::Notification,
    projects::{mock_matching_percent, ProjectAttempt, ProjectTemplate},
    scoring::{Badge, PointsSnapshot},
    store::KeyValueStore,
    AppState,
};

/// What the UI shows after a project is completed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub project_id: u32,
    pub title: String,
    pub elapsed_seconds: f64,
    pub matching_percent: f64,
    pub time_bonus: f64,
    pub matching_bonus: f64,
    pub points_awarded: u64,
    pub user_total: u64,
    pub streak_days: u32,
    pub new_badges: Vec<Badge>,
}

pub fn list_projects<D: MediaDevice, S: KeyValueStore>(
    state: &AppState<D, S>,
) -> Vec<ProjectTemplate> {
    state.projects.catalog().list().to_vec()
}

pub async fn start_project<D: MediaDevice, S: KeyValueStore>(
    state: &AppState<D, S>,
    project_id: u32,
) -> Result<ProjectAttempt, String> {
    let title = state
        .projects
        .project(project_id)
        .map(|project| project.title.clone())
        .map_err(|e| e.to_string())?;

    let attempt = state
        .projects
        .start(project_id)
        .await
        .map_err(|e| e.to_string())?;

    state.notifier.notify(Notification::info(
        format!("Starting {title}"),
        "Project guide has been loaded. Gather your materials to begin!",
    ));

    Ok(attempt)
}

/// Scores the attempt and adds the points to the user's total.
///
/// Without a `matching_percent` a demonstration value between 70 and 100 is
/// used.
pub async fn complete_project<D: MediaDevice, S: KeyValueStore>(
    state: &AppState<D, S>,
    project_id: u32,
    matching_percent: Option<f64>,
) -> Result<CompletionSummary, String> {
    let title = state
        .projects
        .project(project_id)
        .map(|project| project.title.clone())
        .map_err(|e| e.to_string())?;

    let matching_percent = matching_percent.unwrap_or_else(mock_matching_percent);
    let result = state
        .projects
        .complete(project_id, matching_percent)
        .await
        .map_err(|e| e.to_string())?;

    let mut summary = CompletionSummary {
        project_id,
        title,
        elapsed_seconds: result.elapsed_seconds,
        matching_percent: result.matching_percent,
        time_bonus: result.time_bonus,
        matching_bonus: result.matching_bonus,
        points_awarded: result.total_points,
        user_total: 0,
        streak_days: 0,
        new_badges: Vec::new(),
    };
    let record = state.points.award(result, Utc::now());
    summary.user_total = record.total_after;
    summary.new_badges = record.new_badges;
    summary.streak_days = state.points.streak().days;

    state.notifier.notify(Notification::info(
        "Project Completed! 🎉",
        format!(
            "You earned {} points! Time: {}s, Matching: {:.0}%",
            summary.points_awarded,
            summary.elapsed_seconds.round(),
            summary.matching_percent
        ),
    ));

    Ok(summary)
}

pub fn get_user_points<D: MediaDevice, S: KeyValueStore>(
    state: &AppState<D, S>,
) -> PointsSnapshot {
    state.points.snapshot()
}
