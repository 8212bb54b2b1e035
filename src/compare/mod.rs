//! Client side of the `/compare` perceptual-hash matching service.
//!
//! The server computes the hash and searches its card database; this module
//! only builds the multipart request and decodes the verdict.

mod client;
mod types;

pub use client::{
    CompareClient, CompareError, COMPARE_PATH, DEFAULT_SERVER_URL, GENERIC_SERVER_ERROR,
    SERVER_URL_ENV,
};
pub use types::{
    CaptureRequest, ClosestMatch, CompareResult, HashType, ImagePayload, MatchEntry,
    DEFAULT_HASH_SIZE,
};
