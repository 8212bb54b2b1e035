//! Native camera stream backed by a nokhwa capture thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::backend::CameraStream;
use super::capture_loop::{run_capture_loop, CaptureCommand};
use super::device::list_devices;
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Camera capture handle.
///
/// The camera runs a background thread that continuously captures frames
/// and stores the latest one in a shared buffer, the way a live preview
/// always shows the most recent image. Call `start()` to begin capturing
/// and `get_frame()` to read the latest frame.
pub struct CameraCapture {
    /// Most recent frame, written by the capture thread
    frame_buffer: Arc<Mutex<Option<Frame>>>,
    /// Background thread, `None` when stopped
    capture_thread: Option<JoinHandle<()>>,
    /// Command channel into the capture thread
    command_tx: Option<Sender<CaptureCommand>>,
    /// Polled by the capture loop between frames
    stop_signal: Arc<AtomicBool>,
    /// Requested device, resolution and mirroring
    settings: CameraSettings,
    /// Negotiated resolution, set once the stream is open
    actual_resolution: Option<Resolution>,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Prepare a capture handle for the device named in `settings`.
    ///
    /// This checks that the device index exists but does not open the stream
    /// until `start()` is called.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        // Validate the index up front; the device itself is opened by the thread
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        Ok(Self {
            frame_buffer: Arc::new(Mutex::new(None)),
            capture_thread: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
            actual_resolution: None,
        })
    }

    /// Settings this handle was opened with.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Resolution negotiated with the camera, `None` before `start()`.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    /// Start capturing frames in a background thread.
    ///
    /// Blocks until the thread reports whether the stream opened.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If capture is already running
    /// * `CameraError::StreamFailed` - If the camera stream fails to start
    /// * `CameraError::PermissionDenied` - If camera access is denied
    /// * `CameraError::OpenFailed` - If camera fails to open for other reasons
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        // Clear a stop left over from a previous run
        self.stop_signal.store(false, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        // Handles moved into the capture thread
        let buffer = Arc::clone(&self.frame_buffer);
        let stop = Arc::clone(&self.stop_signal);
        let settings = self.settings.clone();

        // One-shot report: negotiated resolution or the open error
        let (info_tx, info_rx) = mpsc::channel::<Result<Resolution, CameraError>>();

        let handle = std::thread::spawn(move || {
            run_capture_loop(settings, buffer, stop, rx, info_tx);
        });
        self.capture_thread = Some(handle);

        // Block until the thread has opened the stream or given up
        match info_rx.recv() {
            Ok(Ok(res)) => {
                log::debug!(
                    "Camera {} streaming at {}",
                    self.settings.device_index,
                    res
                );
                self.actual_resolution = Some(res);
                Ok(())
            }
            Ok(Err(e)) => {
                // Open failed inside the thread; reap it before reporting
                self.join_thread();
                Err(e)
            }
            Err(_) => {
                // Sender dropped without a report, the thread panicked
                self.join_thread();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Signal the background thread to stop and wait for it to finish.
    ///
    /// Safe to call repeatedly.
    pub fn stop(&mut self) {
        // Flag first, the loop checks it every iteration
        self.stop_signal.store(true, Ordering::SeqCst);

        // The command reaches the loop even if the flag is missed
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(CaptureCommand::Stop);
        }

        // Joining releases the device
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }

        // A stopped stream serves no stale frame
        if let Ok(mut buf) = self.frame_buffer.lock() {
            *buf = None;
        }
    }

    /// Latest captured frame, `None` if nothing has been captured yet.
    pub fn get_frame(&self) -> Option<Frame> {
        let buffer = self.frame_buffer.lock().ok()?;
        buffer.clone()
    }

    /// Whether the capture thread is alive.
    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Stop and reap the thread after a failed start.
    fn join_thread(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        self.command_tx = None;
        if let Some(h) = self.capture_thread.take() {
            let _ = h.join();
        }
    }
}

impl CameraStream for CameraCapture {
    fn latest_frame(&self) -> Option<Frame> {
        self.get_frame()
    }

    fn resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }

    fn stop(&mut self) {
        CameraCapture::stop(self);
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        CameraCapture::stop(self);
    }
}
