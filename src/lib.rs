//! card-scanner library crate.
//!
//! Captures a card image from a camera or a file, sends it to a perceptual
//! hash comparison server and renders the verdict.

pub mod app;
pub mod camera;
pub mod cli;
pub mod compare;
pub mod config;
pub mod loader;
pub mod render;
