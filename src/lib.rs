pub mod capture;
pub mod db;
pub mod notify;
pub mod projects;
pub mod scoring;
pub mod settings;
pub mod store;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::info;

use capture::{CaptureController, MediaDevice};
use db::Database;
use notify::Notifier;
use projects::{ProjectCatalog, ProjectTracker};
use scoring::{PointsAccumulator, ScoringEngine};
use settings::{AppSettings, SettingsStore};
use store::KeyValueStore;

pub use utils::init_logging;

/// Everything one UI window needs: its camera surface, the project tracker
/// and the user's point total.
pub struct AppState<D: MediaDevice, S: KeyValueStore> {
    pub camera: CaptureController<D>,
    pub projects: ProjectTracker<S>,
    pub points: PointsAccumulator,
    pub notifier: Arc<dyn Notifier>,
}

impl<D: MediaDevice, S: KeyValueStore> AppState<D, S> {
    pub fn new(device: D, store: S, settings: &AppSettings, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            camera: CaptureController::with_constraints(
                device,
                settings.camera.constraints(),
                settings.camera.jpeg_quality,
            ),
            projects: ProjectTracker::new(
                store,
                ProjectCatalog::default(),
                ScoringEngine::new(settings.scoring.config()),
            ),
            points: PointsAccumulator::new(),
            notifier,
        }
    }
}

/// Opens the SQLite store and settings file under `data_dir`, creating the
/// directory if needed.
pub fn bootstrap<D: MediaDevice>(
    data_dir: &Path,
    device: D,
    notifier: Arc<dyn Notifier>,
) -> Result<(AppState<D, Database>, SettingsStore)> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let database = Database::new(data_dir.join("eduscope.sqlite3"))?;
    let settings = SettingsStore::new(data_dir.join("settings.json"))?;
    let state = AppState::new(device, database, &settings.get(), notifier);

    info!("EduScope core ready in {}", data_dir.display());

    Ok((state, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::mock::MockCamera;
    use crate::notify::LogNotifier;
    use crate::projects::commands::{complete_project, start_project};

    #[tokio::test]
    async fn test_bootstrap_survives_reload() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();

        {
            let (state, _) =
                bootstrap(dir.path(), MockCamera::default(), Arc::new(LogNotifier)).unwrap();
            start_project(&state, 3).await.unwrap();
        }

        let (state, settings) =
            bootstrap(dir.path(), MockCamera::default(), Arc::new(LogNotifier)).unwrap();
        assert!(state.projects.attempt(3).await.unwrap().is_some());
        assert_eq!(settings.scoring().par_seconds, 7200.0);

        let summary = complete_project(&state, 3, Some(80.0)).await.unwrap();
        assert_eq!(summary.points_awarded, 270);
        assert!(state.projects.attempt(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_settings_shape_controller() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        settings
            .update_camera(settings::CameraSettings {
                facing_mode: capture::FacingMode::User,
                ..settings.camera()
            })
            .unwrap();

        let state = AppState::new(
            MockCamera::default(),
            store::MemoryStore::new(),
            &settings.get(),
            Arc::new(LogNotifier),
        );

        assert_eq!(state.camera.constraints().facing_mode, capture::FacingMode::User);
    }
}
