//! Seam between the capture controller and whatever owns the camera.
//!
//! The UI shell implements [`MediaDevice`] over the platform camera API; tests
//! use [`super::mock::MockCamera`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    /// Rear camera.
    Environment,
    /// Front camera.
    User,
}

impl Default for FacingMode {
    fn default() -> Self {
        FacingMode::Environment
    }
}

/// Requested capabilities. The resolution is a hint, the device reports what
/// it actually delivers through [`MediaStream::settings`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackSettings {
    pub width: u32,
    pub height: u32,
    pub facing_mode: FacingMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera found")]
    NotFound,
    #[error("camera busy: {0}")]
    Busy(String),
}

/// One RGBA8 frame as delivered by the device.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RawFrame {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.rgba.len() == self.pixel_count() * 4
    }
}

#[allow(async_fn_in_trait)]
pub trait MediaDevice: Send + Sync {
    type Stream: MediaStream;

    /// Resolves once the user or platform grants or refuses access. Dropping
    /// the returned future abandons the request.
    async fn request_access(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Self::Stream, DeviceError>;
}

/// A granted camera handle. Its tracks stay acquired until
/// [`MediaStream::stop_tracks`] is called.
pub trait MediaStream: Send {
    fn settings(&self) -> TrackSettings;

    /// Pulls the frame currently shown on the live feed.
    fn grab_frame(&mut self) -> Result<RawFrame, DeviceError>;

    /// Stops every track. Must tolerate repeated calls.
    fn stop_tracks(&mut self);
}
