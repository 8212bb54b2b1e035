//! Camera types and data structures.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Which way the camera points, as requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front camera (selfie side)
    User,
    /// Rear camera
    #[default]
    Environment,
}

impl Facing {
    /// The opposite facing mode.
    pub fn toggle(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Facing::User => "user",
            Facing::Environment => "environment",
        }
    }

    /// Short French label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Facing::User => "avant",
            Facing::Environment => "arrière",
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "front" => Ok(Facing::User),
            "environment" | "back" | "rear" => Ok(Facing::Environment),
            other => Err(format!(
                "Unknown facing mode '{}'. Use 'user' or 'environment'",
                other
            )),
        }
    }
}

/// Information about an available camera device.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Medium resolution (640x480), what most webcams deliver without negotiation
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// High resolution (1280x720)
    pub const HIGH: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A captured camera frame in packed RGB8.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// True when the frame has no pixels or its buffer is shorter than
    /// `width * height * 3`.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0
            || self.height == 0
            || self.data.len() < self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }
}

/// Settings for opening a camera stream.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Requested capture resolution
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: false,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// No cameras found on the system
    NoDevices,
    /// Failed to query camera devices
    QueryFailed(String),
    /// Failed to open camera
    OpenFailed(String),
    /// Camera permission denied by the OS
    PermissionDenied,
    /// Camera device not found at specified index
    DeviceNotFound(u32),
    /// Failed to start video stream
    StreamFailed(String),
    /// Capture thread is already running
    AlreadyRunning,
    /// Both the facing-mode request and the device fallback failed
    AccessFailed { facing: Facing, reason: String },
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoDevices => write!(f, "Aucune caméra trouvée"),
            CameraError::QueryFailed(msg) => write!(f, "Impossible de lister les caméras : {}", msg),
            CameraError::OpenFailed(msg) => write!(f, "Impossible d'ouvrir la caméra : {}", msg),
            CameraError::PermissionDenied => {
                write!(
                    f,
                    "Accès à la caméra refusé. Autorisez le terminal dans les réglages de confidentialité du système"
                )
            }
            CameraError::DeviceNotFound(index) => {
                write!(
                    f,
                    "Caméra {} introuvable. Lancez 'list-cameras' pour voir les caméras disponibles",
                    index
                )
            }
            CameraError::StreamFailed(msg) => write!(f, "Impossible de démarrer le flux vidéo : {}", msg),
            CameraError::AlreadyRunning => write!(f, "La capture est déjà en cours"),
            CameraError::AccessFailed { facing, reason } => {
                write!(f, "Accès impossible à la caméra {} : {}", facing.label(), reason)
            }
        }
    }
}

impl std::error::Error for CameraError {}
