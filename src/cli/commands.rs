//! Subcommand handlers.

use std::path::Path;
use std::time::Duration;

use super::args::{ConfigAction, HashArgs};
use crate::app::{App, AppError, CompareSettings};
use crate::camera::{
    wait_for_frame, CameraSession, CameraSettings, Facing, FrameCapturer, NativeBackend,
    Resolution,
};
use crate::compare::{CompareClient, CompareError, CompareResult};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG_TOML};
use crate::loader::load_image;
use crate::render::{render_result, RenderOptions};

/// Merge hash options: CLI > config.
pub fn compare_settings(config: &Config, hash: &HashArgs) -> CompareSettings {
    CompareSettings {
        hash_type: hash.hash_type.unwrap_or(config.hash.hash_type),
        hash_size: hash.hash_size.unwrap_or(config.hash.hash_size),
        max_distance: hash.max_distance.or(config.hash.max_distance),
        limit: hash.limit.or(config.hash.limit),
        warmup: Duration::from_millis(config.camera.warmup_ms),
        render: RenderOptions {
            localized_names: config.display.localized_names,
        },
    }
}

pub fn camera_settings(config: &Config) -> CameraSettings {
    CameraSettings {
        resolution: Resolution {
            width: config.camera.width,
            height: config.camera.height,
        },
        mirror: config.camera.mirror,
        ..CameraSettings::default()
    }
}

pub fn build_client(config: &Config) -> Result<CompareClient, CompareError> {
    CompareClient::with_timeout(
        &config.server.url,
        config.server.timeout_secs.map(Duration::from_secs),
    )
}

/// Interactive session on stdin/stdout.
pub async fn run_interactive(
    config: &Config,
    facing: Option<Facing>,
    hash: &HashArgs,
) -> Result<(), AppError> {
    let facing = facing.unwrap_or(config.camera.facing);
    let session = CameraSession::new(NativeBackend::new(camera_settings(config)), facing);
    let mut app = App::new(
        session,
        FrameCapturer::new(config.camera.jpeg_quality),
        build_client(config)?,
        compare_settings(config, hash),
    );

    println!("Serveur: {}", compare_endpoint(config));
    match app.start_camera() {
        Ok(()) => println!("{}", app.session().label()),
        Err(e) => {
            // The session stays usable for file comparisons and retries
            println!("{}", crate::render::render_error(&e));
        }
    }
    println!("{}", crate::app::HELP_TEXT);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    if let Err(e) = app.run(stdin, &mut stdout).await {
        log::error!("Input error: {}", e);
    }
    Ok(())
}

/// Capture one frame and print the comparison.
pub async fn run_capture(
    config: &Config,
    facing: Option<Facing>,
    hash: &HashArgs,
    json: bool,
) -> Result<(), AppError> {
    let client = build_client(config)?;
    let settings = compare_settings(config, hash);
    let facing = facing.unwrap_or(config.camera.facing);

    let mut session = CameraSession::new(NativeBackend::new(camera_settings(config)), facing);
    session.start(facing)?;
    log::info!("{}", session.label());

    let stream = session.stream().ok_or(AppError::NoCamera)?;
    let frame = wait_for_frame(stream, settings.warmup).await?;
    let payload = FrameCapturer::new(config.camera.jpeg_quality).encode(&frame)?;
    session.stop();

    let result = client.compare(&settings.request(payload)).await?;
    print_result(&result, &settings.render, json);
    Ok(())
}

/// Compare one image file and print the result.
pub async fn run_file(
    config: &Config,
    path: &Path,
    hash: &HashArgs,
    json: bool,
    data_url: bool,
) -> Result<(), AppError> {
    let client = build_client(config)?;
    let settings = compare_settings(config, hash);

    let loaded = load_image(path)?;
    if data_url {
        println!("{}", loaded.data_url());
    }

    let result = client.compare(&settings.request(loaded.into_payload())).await?;
    print_result(&result, &settings.render, json);
    Ok(())
}

fn print_result(result: &CompareResult, options: &RenderOptions, json: bool) {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(text) => println!("{}", text),
            Err(e) => log::error!("Failed to serialize result: {}", e),
        }
    } else {
        print!("{}", render_result(result, options));
    }
}

fn compare_endpoint(config: &Config) -> String {
    format!("{}/compare", config.server.url.trim_end_matches('/'))
}

/// List available cameras with their inferred facing.
pub fn list_cameras(config: &Config) {
    let mut session = CameraSession::new(
        NativeBackend::new(camera_settings(config)),
        config.camera.facing,
    );
    match session.list_cameras() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("No cameras found.");
                println!();
                println!("Make sure your camera is connected and permissions are granted.");
            } else {
                println!("Available cameras:");
                for (device, facing) in devices {
                    let facing = facing.map(|f| f.as_str()).unwrap_or("unknown");
                    println!("  {} - facing: {}", device, facing);
                }
                println!();
                println!("Use --facing user|environment to choose a camera.");
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config: &Config, config_path: Option<&Path>) {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Server: {}", config.server.url);
            match config.server.timeout_secs {
                Some(secs) => println!("  Timeout: {}s", secs),
                None => println!("  Timeout: none"),
            }
            println!("  Hash type: {}", config.hash.hash_type);
            println!("  Hash size: {}", config.hash.hash_size);
            println!("  Max distance: {}", optional(config.hash.max_distance));
            println!("  Limit: {}", optional(config.hash.limit));
            println!("  Facing: {}", config.camera.facing);
            println!("  Mirror: {}", if config.camera.mirror { "yes" } else { "no" });
            println!("  JPEG quality: {}", config.camera.jpeg_quality);
            println!(
                "  Resolution: {}x{}",
                config.camera.width, config.camera.height
            );
            println!(
                "  Localized names: {}",
                if config.display.localized_names { "yes" } else { "no" }
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'card-scanner config show' to view current settings.");
                std::process::exit(1);
            }

            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            if let Err(e) = std::fs::write(&config_path, DEFAULT_CONFIG_TOML) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", config_path.display());
        }
    }
}

fn optional(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "server default".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::HashType;

    #[test]
    fn test_compare_settings_cli_overrides_config() {
        let mut config = Config::default();
        config.hash.hash_type = HashType::Ahash;
        config.hash.max_distance = Some(20);
        config.hash.limit = Some(3);
        config.display.localized_names = true;

        let hash = HashArgs {
            hash_type: Some(HashType::Whash),
            hash_size: Some(8),
            max_distance: None,
            limit: Some(10),
        };
        let settings = compare_settings(&config, &hash);
        assert_eq!(settings.hash_type, HashType::Whash);
        assert_eq!(settings.hash_size, 8);
        assert_eq!(settings.max_distance, Some(20));
        assert_eq!(settings.limit, Some(10));
        assert_eq!(settings.warmup, Duration::from_millis(3000));
        assert!(settings.render.localized_names);
    }

    #[test]
    fn test_camera_settings_from_config() {
        let mut config = Config::default();
        config.camera.width = 1280;
        config.camera.height = 720;
        config.camera.mirror = true;

        let settings = camera_settings(&config);
        assert_eq!(settings.resolution, Resolution::HIGH);
        assert!(settings.mirror);
        assert_eq!(settings.fps, 30);
    }

    #[test]
    fn test_build_client_uses_server_url() {
        let mut config = Config::default();
        config.server.url = "http://scanner.local:8080/".to_string();
        let client = build_client(&config).unwrap();
        assert_eq!(client.compare_url(), "http://scanner.local:8080/compare");
    }
}
