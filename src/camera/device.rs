//! Camera device enumeration and facing-mode inference.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::types::{CameraError, CameraInfo, Facing};

/// Label fragments for front-facing cameras (English and French).
const FRONT_LABEL_HINTS: &[&str] = &["front", "user", "avant", "frontale"];

/// Label fragments for rear-facing cameras (English and French).
const REAR_LABEL_HINTS: &[&str] = &["back", "rear", "environment", "arrière", "arriere"];

/// List all available camera devices on the system.
///
/// If no cameras are found, returns an empty vector (not an error).
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

/// Guess which way a device points from its label.
///
/// Best-effort: vendors name devices freely, so `None` is common.
/// Rear hints win when a label matches both lists.
pub fn infer_facing(label: &str) -> Option<Facing> {
    let lower = label.to_lowercase();
    if REAR_LABEL_HINTS.iter().any(|hint| lower.contains(hint)) {
        Some(Facing::Environment)
    } else if FRONT_LABEL_HINTS.iter().any(|hint| lower.contains(hint)) {
        Some(Facing::User)
    } else {
        None
    }
}

/// Pick the device whose label matches `facing`, or the first device.
pub fn select_device(devices: &[CameraInfo], facing: Facing) -> Option<&CameraInfo> {
    devices
        .iter()
        .find(|d| infer_facing(&d.name) == Some(facing))
        .or_else(|| devices.first())
}
