use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::log_warn;
use crate::projects::ProjectAttempt;
use crate::scoring::config::ScoringConfig;

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "eduscope::scoring";

/// Points awarded for one completed attempt.
///
/// Deliberately not `Clone`: [`PointsAccumulator::apply`] takes it by value,
/// so each result can be added to a total only once.
///
/// [`PointsAccumulator::apply`]: crate::scoring::PointsAccumulator::apply
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub project_id: u32,
    pub elapsed_seconds: f64,
    pub matching_percent: f64,
    pub time_bonus: f64,
    pub matching_bonus: f64,
    pub total_points: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores `attempt` as completed at `now`. An attempt that was never
    /// started counts as finished instantly.
    pub fn score(
        &self,
        attempt: &ProjectAttempt,
        matching_percent: f64,
        now: DateTime<Utc>,
    ) -> ScoreResult {
        let elapsed_seconds = attempt
            .started_at
            .map(|started_at| (now - started_at).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        self.score_elapsed(
            attempt.project_id,
            attempt.base_points,
            elapsed_seconds,
            matching_percent,
        )
    }

    pub fn score_elapsed(
        &self,
        project_id: u32,
        base_points: u32,
        elapsed_seconds: f64,
        matching_percent: f64,
    ) -> ScoreResult {
        let elapsed_seconds = normalize_elapsed(elapsed_seconds);
        let matching_percent = normalize_percent(matching_percent);

        let time_bonus = time_bonus(base_points, elapsed_seconds, self.config.par_seconds);
        let matching_bonus = matching_bonus(base_points, matching_percent);

        ScoreResult {
            project_id,
            elapsed_seconds,
            matching_percent,
            time_bonus,
            matching_bonus,
            total_points: (time_bonus + matching_bonus).round() as u64,
        }
    }
}

/// Decays linearly from `base_points` at zero elapsed time to nothing at par.
pub fn time_bonus(base_points: u32, elapsed_seconds: f64, par_seconds: f64) -> f64 {
    (base_points as f64 * (1.0 - elapsed_seconds / par_seconds)).max(0.0)
}

pub fn matching_bonus(base_points: u32, matching_percent: f64) -> f64 {
    base_points as f64 * (matching_percent / 100.0)
}

fn normalize_percent(matching_percent: f64) -> f64 {
    if matching_percent.is_nan() {
        log_warn!("Matching percent is NaN; scoring it as 0");
        return 0.0;
    }
    if !(0.0..=100.0).contains(&matching_percent) {
        log_warn!("Matching percent {} outside 0-100; clamping", matching_percent);
    }
    matching_percent.clamp(0.0, 100.0)
}

fn normalize_elapsed(elapsed_seconds: f64) -> f64 {
    if elapsed_seconds.is_nan() || elapsed_seconds < 0.0 {
        // start time in the future means clock skew
        return 0.0;
    }
    elapsed_seconds
}
