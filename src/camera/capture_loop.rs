//! Background capture thread implementation.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Commands sent to the capture thread.
pub enum CaptureCommand {
    Stop,
}

/// Run the capture loop in a background thread.
///
/// The camera is opened on this thread because nokhwa cameras are not `Send`
/// on every platform. The outcome of opening is reported once on `info_tx`.
pub fn run_capture_loop(
    settings: CameraSettings,
    buffer: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    rx: Receiver<CaptureCommand>,
    info_tx: Sender<Result<Resolution, CameraError>>,
) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(CameraError::StreamFailed(e.to_string())));
        return;
    }

    let res = camera.resolution();
    let _ = info_tx.send(Ok(Resolution {
        width: res.width(),
        height: res.height(),
    }));

    while !stop.load(Ordering::Relaxed) {
        if let Ok(CaptureCommand::Stop) = rx.try_recv() {
            break;
        }

        if let Ok(raw_frame) = camera.frame() {
            if let Some(mut frame) = convert_to_rgb(&raw_frame) {
                if settings.mirror {
                    mirror_horizontal(&mut frame);
                }
                if let Ok(mut buf) = buffer.lock() {
                    *buf = Some(frame);
                }
            }
            // Undecodable frames are skipped
        }

        thread::sleep(Duration::from_millis(1));
    }

    let _ = camera.stop_stream();
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let resolution =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);

    // MJPEG first (widely supported), then NV12, then whatever the camera prefers
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera {} rejected format request: {}", index, e);
                last_error = Some(e);
            }
        }
    }

    let message = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no format accepted".to_string());
    Err(classify_open_error(&message))
}

/// Map a backend error message to a permission error when it looks like one.
pub(crate) fn classify_open_error(message: &str) -> CameraError {
    let msg = message.to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("not authorized")
    {
        CameraError::PermissionDenied
    } else {
        CameraError::OpenFailed(message.to_string())
    }
}
