use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{log_debug, log_info, log_warn};

use super::device::{CaptureConstraints, MediaDevice, MediaStream};
use super::error::CaptureError;
use super::frame::CapturedFrame;
use super::guard::CaptureScope;
use super::state::{CaptureSnapshot, CaptureState};

const ENABLE_LOGS: bool = true;
const LOG_TARGET: &str = "eduscope::capture";

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// The single handle slot behind a controller.
struct SessionSlot<S> {
    state: CaptureState,
    session_id: Option<Uuid>,
    stream: Option<S>,
    cancel_token: Option<CancellationToken>,
    last_frame: Option<CapturedFrame>,
    last_error: Option<String>,
}

impl<S: MediaStream> SessionSlot<S> {
    fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            session_id: None,
            stream: None,
            cancel_token: None,
            last_frame: None,
            last_error: None,
        }
    }

    fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            state: self.state,
            session_id: self.session_id,
            stream: self.stream.as_ref().map(|stream| stream.settings()),
            last_frame: self.last_frame.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn release(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
        }
    }

    fn fail(&mut self, message: String) {
        self.release();
        self.state = CaptureState::Failed;
        self.last_error = Some(message);
    }
}

/// Resets a request whose `open()` future was dropped before the device
/// answered, so the slot does not stay in `Requesting`.
struct PendingRequest<'a, S: MediaStream> {
    slot: &'a Mutex<SessionSlot<S>>,
    session_id: Uuid,
    armed: bool,
}

impl<S: MediaStream> PendingRequest<'_, S> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<S: MediaStream> Drop for PendingRequest<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut slot = lock(self.slot);
        if slot.session_id == Some(self.session_id) && slot.state == CaptureState::Requesting {
            log_info!(
                "Camera request for session {} abandoned; back to idle",
                self.session_id
            );
            slot.release();
            slot.state = CaptureState::Idle;
            slot.session_id = None;
        }
    }
}

fn lock<S>(slot: &Mutex<SessionSlot<S>>) -> MutexGuard<'_, SessionSlot<S>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Owns one camera surface: acquisition, single-frame capture and release.
///
/// Dropping the controller closes the session, so a camera handle never
/// outlives the surface that owns it.
pub struct CaptureController<D: MediaDevice> {
    device: D,
    constraints: CaptureConstraints,
    jpeg_quality: u8,
    slot: Mutex<SessionSlot<D::Stream>>,
}

impl<D: MediaDevice> CaptureController<D> {
    pub fn new(device: D) -> Self {
        Self::with_constraints(device, CaptureConstraints::default(), DEFAULT_JPEG_QUALITY)
    }

    pub fn with_constraints(device: D, constraints: CaptureConstraints, jpeg_quality: u8) -> Self {
        Self {
            device,
            constraints,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            slot: Mutex::new(SessionSlot::new()),
        }
    }

    pub fn constraints(&self) -> CaptureConstraints {
        self.constraints
    }

    pub fn state(&self) -> CaptureState {
        self.lock_slot().state
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        self.lock_slot().snapshot()
    }

    pub fn last_frame(&self) -> Option<CapturedFrame> {
        self.lock_slot().last_frame.clone()
    }

    /// Borrows the controller for the lifetime of a UI surface; the session is
    /// closed when the scope is dropped.
    pub fn scope(&self) -> CaptureScope<'_, D> {
        CaptureScope::new(self)
    }

    /// Requests the camera and waits for the answer.
    ///
    /// Rejected with [`CaptureError::InvalidState`] while a request is pending
    /// or a stream is live. A [`close`](Self::close) issued while waiting makes
    /// this return [`CaptureError::Closed`], and a grant that races the close
    /// is stopped on the spot. Dropping the returned future before it resolves
    /// puts the session back to `Idle`.
    pub async fn open(&self) -> Result<CaptureSnapshot, CaptureError> {
        let (session_id, cancel_token) = {
            let mut slot = self.lock_slot();
            if !slot.state.can_open() {
                return Err(CaptureError::invalid_state("open", slot.state));
            }

            let session_id = Uuid::new_v4();
            let cancel_token = CancellationToken::new();
            slot.state = CaptureState::Requesting;
            slot.session_id = Some(session_id);
            slot.cancel_token = Some(cancel_token.clone());
            slot.last_error = None;
            (session_id, cancel_token)
        };

        log_info!(
            "Requesting camera for session {} ({:?}, ideal {}x{})",
            session_id,
            self.constraints.facing_mode,
            self.constraints.ideal_width,
            self.constraints.ideal_height
        );

        let mut pending = PendingRequest {
            slot: &self.slot,
            session_id,
            armed: true,
        };

        let answer = tokio::select! {
            _ = cancel_token.cancelled() => None,
            result = self.device.request_access(&self.constraints) => Some(result),
        };
        pending.disarm();

        let mut slot = self.lock_slot();
        let still_current =
            slot.session_id == Some(session_id) && slot.state == CaptureState::Requesting;

        match answer {
            None => {
                log_info!("Camera request for session {} cancelled", session_id);
                Err(CaptureError::Closed)
            }
            Some(Ok(mut stream)) => {
                if !still_current {
                    log_warn!(
                        "Camera granted after session {} was closed; releasing it",
                        session_id
                    );
                    stream.stop_tracks();
                    return Err(CaptureError::Closed);
                }

                let settings = stream.settings();
                slot.cancel_token = None;
                slot.stream = Some(stream);
                slot.state = CaptureState::Streaming;
                log_info!(
                    "Camera streaming for session {} at {}x{}",
                    session_id,
                    settings.width,
                    settings.height
                );
                Ok(slot.snapshot())
            }
            Some(Err(reason)) => {
                if still_current {
                    slot.cancel_token = None;
                    slot.state = CaptureState::Failed;
                    slot.last_error = Some(reason.to_string());
                }
                log_warn!("Camera unavailable for session {}: {}", session_id, reason);
                Err(CaptureError::CameraUnavailable(reason))
            }
        }
    }

    /// Freezes the current frame and releases the feed.
    ///
    /// Only valid while streaming; any other state leaves `last_frame` as it
    /// was. A grab or encode failure still releases the camera and moves the
    /// session to `Failed`.
    pub fn capture(&self) -> Result<CapturedFrame, CaptureError> {
        let mut slot = self.lock_slot();
        if slot.state != CaptureState::Streaming {
            return Err(CaptureError::invalid_state("capture", slot.state));
        }

        let mut stream = match slot.stream.take() {
            Some(stream) => stream,
            None => return Err(CaptureError::invalid_state("capture", slot.state)),
        };

        let settings = stream.settings();
        let result = stream
            .grab_frame()
            .map_err(CaptureError::Device)
            .and_then(|raw| {
                if (raw.width, raw.height) != (settings.width, settings.height) {
                    return Err(CaptureError::InvalidFrame {
                        width: raw.width,
                        height: raw.height,
                        len: raw.rgba.len(),
                    });
                }
                CapturedFrame::encode(&raw, self.jpeg_quality)
            });
        stream.stop_tracks();

        match result {
            Ok(frame) => {
                log_info!(
                    "Captured {}x{} frame for session {:?}",
                    frame.width,
                    frame.height,
                    slot.session_id
                );
                slot.state = CaptureState::Captured;
                slot.last_frame = Some(frame.clone());
                Ok(frame)
            }
            Err(err) => {
                log_warn!("Capture failed for session {:?}: {}", slot.session_id, err);
                slot.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// Stops every track and returns to `Idle`. Safe from any state.
    pub fn close(&self) -> CaptureSnapshot {
        let mut slot = self.lock_slot();
        if slot.state == CaptureState::Idle && slot.stream.is_none() {
            return slot.snapshot();
        }

        log_debug!(
            "Closing capture session {:?} from {}",
            slot.session_id,
            slot.state
        );
        slot.release();
        slot.state = CaptureState::Idle;
        slot.session_id = None;
        slot.snapshot()
    }

    fn lock_slot(&self) -> MutexGuard<'_, SessionSlot<D::Stream>> {
        lock(&self.slot)
    }
}

impl<D: MediaDevice> Drop for CaptureController<D> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::device::{DeviceError, FacingMode};
    use crate::capture::mock::{MockBehavior, MockCamera};

    #[tokio::test]
    async fn test_open_streams_at_native_resolution() {
        let camera = MockCamera::new(640, 480);
        let controller = CaptureController::new(camera.clone());

        let snapshot = controller.open().await.unwrap();

        assert_eq!(snapshot.state, CaptureState::Streaming);
        assert!(snapshot.ready_to_render());
        let stream = snapshot.stream.unwrap();
        assert_eq!((stream.width, stream.height), (640, 480));
        assert_eq!(stream.facing_mode, FacingMode::Environment);
        assert_eq!(camera.live_tracks(), 1);
    }

    #[tokio::test]
    async fn test_capture_releases_feed() {
        let camera = MockCamera::new(64, 48);
        let controller = CaptureController::new(camera.clone());
        controller.open().await.unwrap();

        let frame = controller.capture().unwrap();

        assert_eq!((frame.width, frame.height), (64, 48));
        assert!(frame.data_uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(controller.state(), CaptureState::Captured);
        assert_eq!(controller.last_frame(), Some(frame));
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_second_capture_is_rejected() {
        let controller = CaptureController::new(MockCamera::new(16, 16));
        controller.open().await.unwrap();
        let first = controller.capture().unwrap();

        let err = controller.capture().unwrap_err();

        assert!(matches!(
            err,
            CaptureError::InvalidState {
                state: CaptureState::Captured,
                ..
            }
        ));
        assert_eq!(controller.last_frame(), Some(first));
    }

    #[tokio::test]
    async fn test_denied_and_missing_camera_are_unavailable() {
        for behavior in [MockBehavior::Deny, MockBehavior::NoDevice] {
            let camera = MockCamera::default().with_behavior(behavior);
            let controller = CaptureController::new(camera.clone());

            let err = controller.open().await.unwrap_err();

            assert!(err.is_camera_unavailable());
            assert_eq!(controller.state(), CaptureState::Failed);
            assert!(controller.snapshot().last_error.is_some());
            assert_eq!(camera.live_tracks(), 0);
        }
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let camera = MockCamera::default().with_behavior(MockBehavior::Deny);
        let controller = CaptureController::new(camera.clone());
        assert!(matches!(
            controller.open().await,
            Err(CaptureError::CameraUnavailable(DeviceError::PermissionDenied))
        ));

        camera.set_behavior(MockBehavior::Grant);
        let snapshot = controller.open().await.unwrap();

        assert_eq!(snapshot.state, CaptureState::Streaming);
        assert!(snapshot.last_error.is_none());
        assert_eq!(camera.request_count(), 2);
    }

    #[tokio::test]
    async fn test_open_while_streaming_is_rejected() {
        let camera = MockCamera::default();
        let controller = CaptureController::new(camera.clone());
        controller.open().await.unwrap();

        let err = controller.open().await.unwrap_err();

        assert!(matches!(
            err,
            CaptureError::InvalidState {
                operation: "open",
                state: CaptureState::Streaming
            }
        ));
        assert_eq!(camera.live_tracks(), 1);
        assert_eq!(camera.request_count(), 1);
    }

    #[tokio::test]
    async fn test_open_while_requesting_is_rejected() {
        let camera = MockCamera::default().with_behavior(MockBehavior::Pending);
        let controller = CaptureController::new(camera.clone());

        let (first, second) = tokio::join!(controller.open(), async {
            tokio::task::yield_now().await;
            let second = controller.open().await;
            controller.close();
            second
        });

        assert!(matches!(first, Err(CaptureError::Closed)));
        assert!(matches!(
            second,
            Err(CaptureError::InvalidState {
                state: CaptureState::Requesting,
                ..
            })
        ));
        assert_eq!(camera.request_count(), 1);
    }

    #[tokio::test]
    async fn test_close_cancels_pending_request() {
        let camera = MockCamera::default().with_behavior(MockBehavior::Pending);
        let controller = CaptureController::new(camera.clone());

        let (opened, closed) = tokio::join!(controller.open(), async {
            tokio::task::yield_now().await;
            controller.close()
        });

        assert!(matches!(opened, Err(CaptureError::Closed)));
        assert_eq!(closed.state, CaptureState::Idle);
        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_capture_in_idle_or_failed_keeps_last_frame() {
        let camera = MockCamera::new(8, 8);
        let controller = CaptureController::new(camera.clone());

        assert!(matches!(
            controller.capture(),
            Err(CaptureError::InvalidState {
                state: CaptureState::Idle,
                ..
            })
        ));
        assert!(controller.last_frame().is_none());

        controller.open().await.unwrap();
        let frame = controller.capture().unwrap();
        controller.close();

        assert!(controller.capture().is_err());
        assert_eq!(controller.last_frame(), Some(frame.clone()));

        camera.set_behavior(MockBehavior::Deny);
        let _ = controller.open().await;
        assert_eq!(controller.state(), CaptureState::Failed);
        assert!(matches!(
            controller.capture(),
            Err(CaptureError::InvalidState {
                state: CaptureState::Failed,
                ..
            })
        ));
        assert_eq!(controller.last_frame(), Some(frame));
    }

    #[tokio::test]
    async fn test_capture_while_requesting_keeps_last_frame() {
        let camera = MockCamera::new(8, 8);
        let controller = CaptureController::new(camera.clone());
        controller.open().await.unwrap();
        let frame = controller.capture().unwrap();

        camera.set_behavior(MockBehavior::Pending);
        let (opened, captured) = tokio::join!(controller.open(), async {
            tokio::task::yield_now().await;
            let captured = controller.capture();
            controller.close();
            captured
        });

        assert!(matches!(opened, Err(CaptureError::Closed)));
        assert!(matches!(
            captured,
            Err(CaptureError::InvalidState {
                operation: "capture",
                state: CaptureState::Requesting
            })
        ));
        assert_eq!(controller.last_frame(), Some(frame));
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_open_returns_to_idle() {
        let camera = MockCamera::default().with_behavior(MockBehavior::Pending);
        let controller = CaptureController::new(camera.clone());

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(20), controller.open()).await;
        assert!(abandoned.is_err());

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, CaptureState::Idle);
        assert!(snapshot.session_id.is_none());

        camera.set_behavior(MockBehavior::Grant);
        let snapshot = controller.open().await.unwrap();

        assert_eq!(snapshot.state, CaptureState::Streaming);
        assert_eq!(camera.request_count(), 2);
        assert_eq!(camera.live_tracks(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let camera = MockCamera::default();
        let controller = CaptureController::new(camera.clone());

        assert_eq!(controller.close().state, CaptureState::Idle);

        controller.open().await.unwrap();
        controller.close();
        let snapshot = controller.close();

        assert_eq!(snapshot.state, CaptureState::Idle);
        assert!(snapshot.session_id.is_none());
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_failed_grab_releases_camera() {
        let camera = MockCamera::new(8, 8).with_failing_grab();
        let controller = CaptureController::new(camera.clone());
        controller.open().await.unwrap();

        let err = controller.capture().unwrap_err();

        assert!(matches!(err, CaptureError::Device(_)));
        assert_eq!(controller.state(), CaptureState::Failed);
        assert!(controller.last_frame().is_none());
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_stream() {
        let camera = MockCamera::default();
        {
            let controller = CaptureController::new(camera.clone());
            controller.open().await.unwrap();
            assert_eq!(camera.live_tracks(), 1);
        }
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_reopen_after_capture() {
        let camera = MockCamera::new(8, 8);
        let controller = CaptureController::new(camera.clone());
        controller.open().await.unwrap();
        let first_id = controller.snapshot().session_id;
        controller.capture().unwrap();

        let snapshot = controller.open().await.unwrap();

        assert_eq!(snapshot.state, CaptureState::Streaming);
        assert_ne!(snapshot.session_id, first_id);
        assert!(snapshot.last_frame.is_some());
        assert_eq!(camera.live_tracks(), 1);
    }
}
