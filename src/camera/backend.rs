//! Camera backend abstraction.
//!
//! The session manager only talks to these traits so the facing-mode
//! fallback can run against real hardware ([`NativeBackend`]) or a scripted
//! fake in tests.

use super::capture::CameraCapture;
use super::device::list_devices;
use super::types::{CameraError, CameraInfo, CameraSettings, Facing, Frame, Resolution};

/// A running video stream.
pub trait CameraStream {
    /// Most recent frame, `None` until the camera delivers one.
    fn latest_frame(&self) -> Option<Frame>;

    /// Negotiated resolution, if known.
    fn resolution(&self) -> Option<Resolution>;

    fn is_active(&self) -> bool;

    /// Release the device. Must be idempotent.
    fn stop(&mut self);
}

/// Source of camera streams.
pub trait CameraBackend {
    type Stream: CameraStream;

    /// Open a stream using `facing` as a soft preference: any camera is an
    /// acceptable answer.
    fn open_preferred(&mut self, facing: Facing) -> Result<Self::Stream, CameraError>;

    /// Open and immediately release a stream so that device labels become
    /// readable.
    fn request_permission(&mut self) -> Result<(), CameraError>;

    fn list_devices(&mut self) -> Result<Vec<CameraInfo>, CameraError>;

    /// Open a stream pinned to exactly this device.
    fn open_device(&mut self, index: u32) -> Result<Self::Stream, CameraError>;
}

/// Backend over the platform camera API via nokhwa.
#[derive(Debug, Clone, Default)]
pub struct NativeBackend {
    settings: CameraSettings,
}

impl NativeBackend {
    /// `settings.device_index` is ignored; each open chooses its own device.
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }

    fn start_device(&self, index: u32) -> Result<CameraCapture, CameraError> {
        let settings = CameraSettings {
            device_index: index,
            ..self.settings.clone()
        };
        let mut capture = CameraCapture::open(settings)?;
        capture.start()?;
        Ok(capture)
    }
}

impl CameraBackend for NativeBackend {
    type Stream = CameraCapture;

    fn open_preferred(&mut self, facing: Facing) -> Result<CameraCapture, CameraError> {
        // Desktop backends expose no facing metadata, so the system default
        // device satisfies the soft preference.
        log::debug!("Opening default camera for '{}' preference", facing);
        let devices = list_devices()?;
        let first = devices.first().ok_or(CameraError::NoDevices)?;
        self.start_device(first.index)
    }

    fn request_permission(&mut self) -> Result<(), CameraError> {
        let devices = list_devices()?;
        let first = devices.first().ok_or(CameraError::NoDevices)?;
        let mut capture = self.start_device(first.index)?;
        capture.stop();
        Ok(())
    }

    fn list_devices(&mut self) -> Result<Vec<CameraInfo>, CameraError> {
        list_devices()
    }

    fn open_device(&mut self, index: u32) -> Result<CameraCapture, CameraError> {
        self.start_device(index)
    }
}
