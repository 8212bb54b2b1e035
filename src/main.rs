use clap::Parser;
use tracing_subscriber::EnvFilter;

use card_scanner::cli::{self, Args, Command, HashArgs};
use card_scanner::compare::SERVER_URL_ENV;
use card_scanner::config::Config;
use card_scanner::render::render_error;

/// Install the log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load .env so CARD_SCANNER_SERVER can live next to the binary.
///
/// Does not override existing environment variables.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
    if let Ok(url) = std::env::var(SERVER_URL_ENV) {
        log::debug!("{} set to {}", SERVER_URL_ENV, url);
    }
}

/// Config file, then environment, then `--server`.
fn load_config(args: &Args) -> Config {
    let mut config = if let Some(ref path) = args.config {
        match Config::load_from_explicit(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match Config::load(None) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Config::default()
            }
        }
    };

    config.apply_overrides(args.server.as_deref());
    config
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    load_env();

    let config = load_config(&args);

    let result = match args.command {
        None => cli::run_interactive(&config, None, &HashArgs::default()).await,
        Some(Command::Run { facing, hash }) => cli::run_interactive(&config, facing, &hash).await,
        Some(Command::Capture { facing, hash, json }) => {
            cli::run_capture(&config, facing, &hash, json).await
        }
        Some(Command::File {
            path,
            hash,
            json,
            data_url,
        }) => cli::run_file(&config, &path, &hash, json, data_url).await,
        Some(Command::ListCameras) => {
            cli::list_cameras(&config);
            Ok(())
        }
        Some(Command::Config { action }) => {
            cli::handle_config_action(action, &config, args.config.as_deref());
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:?}", e);
        println!("{}", render_error(&e));
        std::process::exit(1);
    }
}
