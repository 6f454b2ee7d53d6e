use crate::{
    capture::{CaptureSnapshot, CapturedFrame, MediaDevice},
    notify::Notification,
    store::KeyValueStore,
    AppState,
};

const CAMERA_ERROR_TITLE: &str = "Camera Error";
const CAMERA_ERROR_MESSAGE: &str =
    "Unable to access camera. Please check permissions and try again.";

pub fn get_camera_state<D: MediaDevice, S: KeyValueStore>(
    state: &AppState<D, S>,
) -> CaptureSnapshot {
    state.camera.snapshot()
}

pub async fn start_camera<D: MediaDevice, S: KeyValueStore>(
    state: &AppState<D, S>,
) -> Result<CaptureSnapshot, String> {
    state.camera.open().await.map_err(|err| {
        if err.is_camera_unavailable() {
            state
                .notifier
                .notify(Notification::error(CAMERA_ERROR_TITLE, CAMERA_ERROR_MESSAGE));
        }
        err.to_string()
    })
}

pub fn capture_image<D: MediaDevice, S: KeyValueStore>(
    state: &AppState<D, S>,
) -> Result<CapturedFrame, String> {
    state.camera.capture().map_err(|err| {
        state
            .notifier
            .notify(Notification::error("Capture Failed", err.to_string()));
        err.to_string()
    })
}

/// Called when the camera surface closes or unmounts.
pub fn stop_camera<D: MediaDevice, S: KeyValueStore>(state: &AppState<D, S>) -> CaptureSnapshot {
    state.camera.close()
}
