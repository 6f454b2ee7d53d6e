use thiserror::Error;

use super::device::DeviceError;
use super::state::CaptureState;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Permission denied and "no camera" are deliberately the same condition.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(DeviceError),
    #[error("cannot {operation} while capture session is {state}")]
    InvalidState {
        operation: &'static str,
        state: CaptureState,
    },
    #[error("capture session was closed before the camera answered")]
    Closed,
    #[error("camera delivered a {width}x{height} frame with {len} bytes")]
    InvalidFrame { width: u32, height: u32, len: usize },
    #[error("failed to grab frame: {0}")]
    Device(DeviceError),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

impl CaptureError {
    pub fn invalid_state(operation: &'static str, state: CaptureState) -> Self {
        CaptureError::InvalidState { operation, state }
    }

    pub fn is_camera_unavailable(&self) -> bool {
        matches!(self, CaptureError::CameraUnavailable(_))
    }
}
