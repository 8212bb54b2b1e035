//! Camera session manager.
//!
//! Owns at most one live stream and the user's facing preference. Starting a
//! session first asks the backend for the preferred facing mode; if that
//! fails it falls back to enumerating devices and pinning the one whose label
//! matches.

use super::backend::{CameraBackend, CameraStream};
use super::device::{infer_facing, select_device};
use super::types::{CameraError, CameraInfo, Facing};

pub struct CameraSession<B: CameraBackend> {
    backend: B,
    stream: Option<B::Stream>,
    facing: Facing,
    label: String,
}

impl<B: CameraBackend> CameraSession<B> {
    pub fn new(backend: B, facing: Facing) -> Self {
        Self {
            backend,
            stream: None,
            facing,
            label: String::new(),
        }
    }

    /// Stored facing preference.
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// User-visible label for the last successfully started camera.
    ///
    /// Empty until the first successful `start`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stream(&self) -> Option<&B::Stream> {
        self.stream.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the current stream with one for `facing`.
    ///
    /// # Errors
    /// `CameraError::AccessFailed` when both the facing-mode request and the
    /// device fallback fail. The session is left without a stream.
    pub fn start(&mut self, facing: Facing) -> Result<(), CameraError> {
        self.stop();
        self.label.clear();
        self.facing = facing;

        let stream = match self.backend.open_preferred(facing) {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!(
                    "Facing-mode request for '{}' failed ({}), trying device fallback",
                    facing,
                    e
                );
                self.open_by_label(facing).map_err(|fallback| {
                    log::error!("Camera fallback failed: {}", fallback);
                    CameraError::AccessFailed {
                        facing,
                        reason: fallback.to_string(),
                    }
                })?
            }
        };

        self.stream = Some(stream);
        self.label = format!("Caméra : {}", facing.label());
        log::info!("Camera started ({})", facing);
        Ok(())
    }

    /// Release the current stream, if any.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            log::debug!("Camera stopped");
        }
    }

    /// Flip the facing preference and restart with it.
    pub fn toggle(&mut self) -> Result<(), CameraError> {
        self.start(self.facing.toggle())
    }

    /// Devices with their label-inferred facing.
    pub fn list_cameras(&mut self) -> Result<Vec<(CameraInfo, Option<Facing>)>, CameraError> {
        Ok(self
            .backend
            .list_devices()?
            .into_iter()
            .map(|d| {
                let facing = infer_facing(&d.name);
                (d, facing)
            })
            .collect())
    }

    fn open_by_label(&mut self, facing: Facing) -> Result<B::Stream, CameraError> {
        // Labels stay blank until access has been granted once
        if let Err(e) = self.backend.request_permission() {
            log::debug!("Permission probe failed: {}", e);
        }

        let devices = self.backend.list_devices()?;
        let device = select_device(&devices, facing).ok_or(CameraError::NoDevices)?;
        log::debug!("Falling back to camera {}", device);
        self.backend.open_device(device.index)
    }
}

impl<B: CameraBackend> Drop for CameraSession<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<B: CameraBackend> std::fmt::Debug for CameraSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("facing", &self.facing)
            .field("label", &self.label)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
