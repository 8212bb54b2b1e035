//! Shared test doubles: a scripted camera backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use card_scanner::camera::{CameraBackend, CameraError, CameraInfo, CameraStream, Facing, Frame, Resolution};

/// Where a fake stream came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Preferred(Facing),
    Device(u32),
}

#[derive(Debug)]
pub struct FakeStream {
    pub source: Source,
    frame: Option<Frame>,
    active: bool,
    live: Arc<AtomicUsize>,
}

impl CameraStream for FakeStream {
    fn latest_frame(&self) -> Option<Frame> {
        if self.active {
            self.frame.clone()
        } else {
            None
        }
    }

    fn resolution(&self) -> Option<Resolution> {
        self.frame.as_ref().map(|f| Resolution {
            width: f.width,
            height: f.height,
        })
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Backend whose answers are fixed up front; every call is recorded.
#[derive(Debug)]
pub struct FakeBackend {
    pub preferred_ok: bool,
    pub device_ok: bool,
    pub devices: Vec<CameraInfo>,
    pub frame: Option<Frame>,
    pub calls: Vec<String>,
    live: Arc<AtomicUsize>,
}

impl FakeBackend {
    /// Facing-mode requests succeed.
    pub fn working() -> Self {
        Self {
            preferred_ok: true,
            device_ok: true,
            devices: vec![device(0, "Front Camera"), device(1, "Back Camera")],
            frame: Some(test_frame(16, 12)),
            calls: Vec::new(),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Facing-mode requests fail; device-pinned opens succeed.
    pub fn without_facing_support() -> Self {
        Self {
            preferred_ok: false,
            ..Self::working()
        }
    }

    /// Every open fails.
    pub fn broken() -> Self {
        Self {
            preferred_ok: false,
            device_ok: false,
            ..Self::working()
        }
    }

    pub fn with_devices(mut self, devices: Vec<CameraInfo>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_frame(mut self, frame: Option<Frame>) -> Self {
        self.frame = frame;
        self
    }

    /// Streams opened and not yet stopped.
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }

    fn new_stream(&self, source: Source) -> FakeStream {
        self.live.fetch_add(1, Ordering::SeqCst);
        FakeStream {
            source,
            frame: self.frame.clone(),
            active: true,
            live: Arc::clone(&self.live),
        }
    }
}

impl CameraBackend for FakeBackend {
    type Stream = FakeStream;

    fn open_preferred(&mut self, facing: Facing) -> Result<FakeStream, CameraError> {
        self.calls.push(format!("open_preferred({})", facing));
        if self.preferred_ok {
            Ok(self.new_stream(Source::Preferred(facing)))
        } else {
            Err(CameraError::OpenFailed("facing mode not supported".to_string()))
        }
    }

    fn request_permission(&mut self) -> Result<(), CameraError> {
        self.calls.push("request_permission".to_string());
        if self.device_ok {
            Ok(())
        } else {
            Err(CameraError::PermissionDenied)
        }
    }

    fn list_devices(&mut self) -> Result<Vec<CameraInfo>, CameraError> {
        self.calls.push("list_devices".to_string());
        Ok(self.devices.clone())
    }

    fn open_device(&mut self, index: u32) -> Result<FakeStream, CameraError> {
        self.calls.push(format!("open_device({})", index));
        if self.device_ok && self.devices.iter().any(|d| d.index == index) {
            Ok(self.new_stream(Source::Device(index)))
        } else {
            Err(CameraError::DeviceNotFound(index))
        }
    }
}

pub fn device(index: u32, name: &str) -> CameraInfo {
    CameraInfo {
        index,
        name: name.to_string(),
        description: "fake".to_string(),
    }
}

/// Mid-grey RGB frame.
pub fn test_frame(width: u32, height: u32) -> Frame {
    Frame {
        data: vec![128; (width * height * 3) as usize],
        width,
        height,
        timestamp: Instant::now(),
    }
}
