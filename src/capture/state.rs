use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::device::TrackSettings;
use super::frame::CapturedFrame;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CaptureState {
    Idle,
    Requesting,
    Streaming,
    Captured,
    Failed,
}

impl Default for CaptureState {
    fn default() -> Self {
        CaptureState::Idle
    }
}

impl CaptureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureState::Idle => "Idle",
            CaptureState::Requesting => "Requesting",
            CaptureState::Streaming => "Streaming",
            CaptureState::Captured => "Captured",
            CaptureState::Failed => "Failed",
        }
    }

    /// A device handle may only be acquired from these states.
    pub fn can_open(&self) -> bool {
        !matches!(self, CaptureState::Requesting | CaptureState::Streaming)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the UI needs to render the camera surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub state: CaptureState,
    pub session_id: Option<Uuid>,
    /// Native resolution of the live feed, present only while streaming.
    pub stream: Option<TrackSettings>,
    pub last_frame: Option<CapturedFrame>,
    pub last_error: Option<String>,
}

impl CaptureSnapshot {
    pub fn ready_to_render(&self) -> bool {
        self.state == CaptureState::Streaming && self.stream.is_some()
    }
}
