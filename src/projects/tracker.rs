use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::scoring::{ScoreResult, ScoringEngine};
use crate::store::KeyValueStore;
use crate::{log_info, log_warn};

use super::attempt::{decode_started_at, encode_started_at, start_key, ProjectAttempt};
use super::catalog::{ProjectCatalog, ProjectTemplate};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "eduscope::projects";

/// Starts and completes project attempts, keeping start times in `S` so they
/// survive a reload.
pub struct ProjectTracker<S: KeyValueStore> {
    store: S,
    catalog: ProjectCatalog,
    engine: ScoringEngine,
}

impl<S: KeyValueStore> ProjectTracker<S> {
    pub fn new(store: S, catalog: ProjectCatalog, engine: ScoringEngine) -> Self {
        Self {
            store,
            catalog,
            engine,
        }
    }

    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn project(&self, project_id: u32) -> Result<&ProjectTemplate> {
        self.catalog
            .get(project_id)
            .ok_or_else(|| anyhow!("unknown project {project_id}"))
    }

    pub async fn start(&self, project_id: u32) -> Result<ProjectAttempt> {
        self.start_at(project_id, Utc::now()).await
    }

    /// Records `now` as the start of a fresh attempt, replacing any earlier
    /// one for the same project.
    pub async fn start_at(&self, project_id: u32, now: DateTime<Utc>) -> Result<ProjectAttempt> {
        let base_points = self.project(project_id)?.base_points;
        self.store
            .set(&start_key(project_id), &encode_started_at(now))
            .await?;

        log_info!("Started project {} at {}", project_id, now.to_rfc3339());

        Ok(ProjectAttempt {
            project_id,
            base_points,
            started_at: Some(now),
        })
    }

    /// Looks at the current attempt without consuming it.
    pub async fn attempt(&self, project_id: u32) -> Result<Option<ProjectAttempt>> {
        let base_points = self.project(project_id)?.base_points;
        let raw = self.store.get(&start_key(project_id)).await?;

        Ok(raw.map(|raw| ProjectAttempt {
            project_id,
            base_points,
            started_at: parse_start(project_id, &raw),
        }))
    }

    pub async fn complete(&self, project_id: u32, matching_percent: f64) -> Result<ScoreResult> {
        self.complete_at(project_id, matching_percent, Utc::now())
            .await
    }

    /// Consumes the attempt and scores it.
    ///
    /// Only an unknown project is an error. A missing, unreadable or
    /// unparsable start time scores as zero elapsed time.
    pub async fn complete_at(
        &self,
        project_id: u32,
        matching_percent: f64,
        now: DateTime<Utc>,
    ) -> Result<ScoreResult> {
        let base_points = self.project(project_id)?.base_points;

        let started_at = match self.store.remove(&start_key(project_id)).await {
            Ok(Some(raw)) => parse_start(project_id, &raw),
            Ok(None) => {
                log_warn!("Project {} completed without a recorded start", project_id);
                None
            }
            Err(err) => {
                log_warn!("Failed to read start of project {}: {:#}", project_id, err);
                None
            }
        };

        let attempt = ProjectAttempt {
            project_id,
            base_points,
            started_at,
        };
        let result = self.engine.score(&attempt, matching_percent, now);

        log_info!(
            "Completed project {} in {:.0}s at {:.1}% match: {} points",
            project_id,
            result.elapsed_seconds,
            result.matching_percent,
            result.total_points
        );

        Ok(result)
    }

    /// Drops an attempt without scoring it. Returns whether one existed.
    pub async fn abandon(&self, project_id: u32) -> Result<bool> {
        Ok(self.store.remove(&start_key(project_id)).await?.is_some())
    }
}

fn parse_start(project_id: u32, raw: &str) -> Option<DateTime<Utc>> {
    match decode_started_at(raw) {
        Ok(started_at) => Some(started_at),
        Err(err) => {
            log_warn!("Ignoring start time of project {}: {}", project_id, err);
            None
        }
    }
}

/// Stand-in for a real classifier: a match between 70% and 100%.
pub fn mock_matching_percent() -> f64 {
    rand::thread_rng().gen_range(70.0..=100.0)
}
