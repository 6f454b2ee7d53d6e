pub mod commands;
pub mod controller;
pub mod device;
pub mod error;
pub mod frame;
pub mod guard;
pub mod mock;
pub mod state;

pub use controller::CaptureController;
pub use device::{CaptureConstraints, DeviceError, FacingMode, MediaDevice, MediaStream};
pub use error::CaptureError;
pub use frame::CapturedFrame;
pub use guard::CaptureScope;
pub use state::{CaptureSnapshot, CaptureState};
