//! Camera access for capture-and-compare.
//!
//! - Device enumeration and label heuristics via [`list_devices`] and [`infer_facing`]
//! - Stream sources behind [`CameraBackend`], with [`NativeBackend`] for real hardware
//! - Facing-mode sessions with device fallback via [`CameraSession`]
//! - JPEG snapshots of the live stream via [`FrameCapturer`]

mod backend;
mod capture;
mod capture_loop;
mod device;
mod frame_utils;
mod session;
mod snapshot;
mod types;

pub use backend::{CameraBackend, CameraStream, NativeBackend};
pub use capture::CameraCapture;
pub use device::{infer_facing, list_devices, select_device};
pub use session::CameraSession;
pub use snapshot::{
    wait_for_frame, CaptureError, FrameCapturer, CAPTURE_FILE_NAME, DEFAULT_JPEG_QUALITY,
};
pub use types::{CameraError, CameraInfo, CameraSettings, Facing, Frame, Resolution};
