//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::camera::Facing;
use crate::compare::HashType;

/// Capture a card with the camera (or pick an image) and look it up on the
/// comparison server
#[derive(Parser, Debug)]
#[command(name = "card-scanner")]
#[command(version, about = "Perceptual-hash card lookup from camera or file", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Comparison server base URL (overrides config and CARD_SCANNER_SERVER)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Hash parameters sent with each comparison.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct HashArgs {
    /// Hash algorithm
    #[arg(long)]
    pub hash_type: Option<HashType>,

    /// Hash size
    #[arg(long)]
    pub hash_size: Option<u32>,

    /// Maximum distance for a match to be reported
    #[arg(long)]
    pub max_distance: Option<u32>,

    /// Maximum number of matches to return
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive session (default)
    Run {
        /// Camera to start with
        #[arg(long)]
        facing: Option<Facing>,

        #[command(flatten)]
        hash: HashArgs,
    },
    /// Capture one camera frame and compare it
    Capture {
        /// Camera to use
        #[arg(long)]
        facing: Option<Facing>,

        #[command(flatten)]
        hash: HashArgs,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare an image file
    File {
        /// Image to send
        path: PathBuf,

        #[command(flatten)]
        hash: HashArgs,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,

        /// Also print the image as a data URL
        #[arg(long)]
        data_url: bool,
    },
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
