use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use super::device::{
    CaptureConstraints, DeviceError, MediaDevice, MediaStream, RawFrame, TrackSettings,
};

/// How a [`MockCamera`] answers the next access request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    Grant,
    Deny,
    NoDevice,
    /// Never answers, like a permission prompt the user ignores.
    Pending,
}

/// Software camera for tests and for running the UI without hardware.
///
/// Tracks are counted on grant and uncounted on `stop_tracks`, never on drop,
/// so a stream the controller forgets to stop shows up in
/// [`MockCamera::live_tracks`].
#[derive(Clone)]
pub struct MockCamera {
    behavior: Arc<Mutex<MockBehavior>>,
    width: u32,
    height: u32,
    fail_grab: bool,
    live_tracks: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

impl MockCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(MockBehavior::Grant)),
            width,
            height,
            fail_grab: false,
            live_tracks: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_behavior(self, behavior: MockBehavior) -> Self {
        self.set_behavior(behavior);
        self
    }

    /// Streams that refuse to hand out frames.
    pub fn with_failing_grab(mut self) -> Self {
        self.fail_grab = true;
        self
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        let mut guard = match self.behavior.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = behavior;
    }

    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn behavior(&self) -> MockBehavior {
        match self.behavior.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl MediaDevice for MockCamera {
    type Stream = MockStream;

    async fn request_access(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<MockStream, DeviceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        match self.behavior() {
            MockBehavior::Grant => {
                self.live_tracks.fetch_add(1, Ordering::SeqCst);
                Ok(MockStream {
                    settings: TrackSettings {
                        width: self.width,
                        height: self.height,
                        facing_mode: constraints.facing_mode,
                    },
                    live: true,
                    fail_grab: self.fail_grab,
                    frames_served: 0,
                    live_tracks: Arc::clone(&self.live_tracks),
                })
            }
            MockBehavior::Deny => Err(DeviceError::PermissionDenied),
            MockBehavior::NoDevice => Err(DeviceError::NotFound),
            MockBehavior::Pending => std::future::pending().await,
        }
    }
}

pub struct MockStream {
    settings: TrackSettings,
    live: bool,
    fail_grab: bool,
    frames_served: u64,
    live_tracks: Arc<AtomicUsize>,
}

impl MediaStream for MockStream {
    fn settings(&self) -> TrackSettings {
        self.settings
    }

    fn grab_frame(&mut self) -> Result<RawFrame, DeviceError> {
        if !self.live {
            return Err(DeviceError::Busy("track already stopped".into()));
        }
        if self.fail_grab {
            return Err(DeviceError::Busy("sensor returned no data".into()));
        }

        self.frames_served += 1;
        let TrackSettings { width, height, .. } = self.settings;
        let shift = self.frames_served as u32;

        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.push(((x + shift) * 255 / width.max(1)) as u8);
                rgba.push((y * 255 / height.max(1)) as u8);
                rgba.push(128);
                rgba.push(255);
            }
        }

        Ok(RawFrame {
            width,
            height,
            rgba,
        })
    }

    fn stop_tracks(&mut self) {
        if self.live {
            self.live = false;
            self.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grant_counts_one_live_track() {
        let camera = MockCamera::new(32, 24);
        let mut stream = camera
            .request_access(&CaptureConstraints::default())
            .await
            .unwrap();

        assert_eq!(camera.live_tracks(), 1);
        assert_eq!(stream.settings().width, 32);

        stream.stop_tracks();
        stream.stop_tracks();
        assert_eq!(camera.live_tracks(), 0);
        assert!(stream.grab_frame().is_err());
    }

    #[tokio::test]
    async fn test_denied_request() {
        let camera = MockCamera::default().with_behavior(MockBehavior::Deny);
        let result = camera.request_access(&CaptureConstraints::default()).await;

        assert!(matches!(result, Err(DeviceError::PermissionDenied)));
        assert_eq!(camera.live_tracks(), 0);
        assert_eq!(camera.request_count(), 1);
    }

    #[tokio::test]
    async fn test_grabbed_frame_matches_settings() {
        let camera = MockCamera::new(20, 10);
        let mut stream = camera
            .request_access(&CaptureConstraints::default())
            .await
            .unwrap();

        let frame = stream.grab_frame().unwrap();
        assert!(frame.is_well_formed());
        assert_eq!((frame.width, frame.height), (20, 10));
        stream.stop_tracks();
    }
}
