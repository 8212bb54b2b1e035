//! Request and response types of the `/compare` endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default perceptual hash size (bits per side).
pub const DEFAULT_HASH_SIZE: u32 = 16;

/// Perceptual hash algorithms understood by the comparison server.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    /// DCT-based perceptual hash
    #[default]
    Phash,
    /// Difference hash
    Dhash,
    /// Average hash
    Ahash,
    /// Wavelet hash
    Whash,
}

impl HashType {
    pub fn as_str(self) -> &'static str {
        match self {
            HashType::Phash => "phash",
            HashType::Dhash => "dhash",
            HashType::Ahash => "ahash",
            HashType::Whash => "whash",
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phash" => Ok(HashType::Phash),
            "dhash" => Ok(HashType::Dhash),
            "ahash" => Ok(HashType::Ahash),
            "whash" => Ok(HashType::Whash),
            other => Err(format!(
                "Unknown hash type '{}'. Available: phash, dhash, ahash, whash",
                other
            )),
        }
    }
}

/// Binary image sent in the `image` form field.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("bytes", &self.bytes.len())
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .finish()
    }
}

/// Everything needed for one `/compare` call.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub image: ImagePayload,
    pub hash_type: HashType,
    pub hash_size: u32,
    pub max_distance: Option<u32>,
    pub limit: Option<u32>,
}

impl CaptureRequest {
    pub fn new(image: ImagePayload, hash_type: HashType, hash_size: u32) -> Self {
        Self {
            image,
            hash_type,
            hash_size,
            max_distance: None,
            limit: None,
        }
    }

    pub fn with_max_distance(mut self, max_distance: Option<u32>) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }
}

/// Single best candidate reported by some server versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestMatch {
    pub name: String,
    pub distance: f64,
    #[serde(default)]
    pub hash: Option<String>,
}

/// One entry of the ranked candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_fr: Option<String>,
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl MatchEntry {
    /// French name when asked for and present, otherwise the default name.
    pub fn display_name(&self, localized: bool) -> &str {
        match (&self.name_fr, localized) {
            (Some(fr), true) if !fr.is_empty() => fr,
            _ => &self.name,
        }
    }
}

/// Parsed success body of `/compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResult {
    pub exact_match: bool,
    pub hash: String,
    pub hash_type: String,
    /// Sent as a number or a string depending on the server version
    #[serde(deserialize_with = "string_or_number")]
    pub hash_size: String,
    #[serde(default)]
    pub total_matches: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_match: Option<ClosestMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_matches: Option<Vec<MatchEntry>>,
}

impl CompareResult {
    /// The ranked list, empty when the server sent none.
    pub fn matches(&self) -> &[MatchEntry] {
        self.closest_matches.as_deref().unwrap_or(&[])
    }
}

/// Error body of a failed `/compare` call.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Text of the `error` field. Falsy values (null, false, 0, "") count as absent.
    pub fn message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
