//! Command-line interface definitions and helpers.

mod args;
mod commands;

pub use args::{Args, Command, ConfigAction, HashArgs};
pub use commands::{
    build_client, camera_settings, compare_settings, handle_config_action, list_cameras,
    run_capture, run_file, run_interactive,
};
