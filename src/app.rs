//! Interactive capture-and-compare session.
//!
//! Reads one command per line, runs it to completion, prints the outcome,
//! then reads the next line. Failures are printed as banners and never end
//! the session.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::camera::{
    wait_for_frame, CameraBackend, CameraError, CameraSession, CaptureError, Facing,
    FrameCapturer,
};
use crate::compare::{CaptureRequest, CompareClient, CompareError, CompareResult, HashType, ImagePayload};
use crate::loader::{load_image, LoadError, LoadedImage};
use crate::render::{render_error, render_result, RenderOptions};

pub const HELP_TEXT: &str = "\
Commandes:
  c, capture      capturer l'image de la caméra et comparer
  f, file <path>  comparer un fichier image
  t, toggle       basculer caméra avant/arrière
  s, start        redémarrer la caméra
  h, help         afficher cette aide
  q, quit         quitter";

/// Errors surfaced by a single user action.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("caméra inactive")]
    NoCamera,

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Compare(#[from] CompareError),
}

/// Per-request parameters shared by every action.
#[derive(Debug, Clone)]
pub struct CompareSettings {
    pub hash_type: HashType,
    pub hash_size: u32,
    pub max_distance: Option<u32>,
    pub limit: Option<u32>,
    /// How long a capture waits for the first frame
    pub warmup: Duration,
    pub render: RenderOptions,
}

impl CompareSettings {
    pub fn request(&self, image: ImagePayload) -> CaptureRequest {
        CaptureRequest::new(image, self.hash_type, self.hash_size)
            .with_max_distance(self.max_distance)
            .with_limit(self.limit)
    }
}

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Capture,
    Toggle,
    Start,
    File(PathBuf),
    Help,
    Quit,
}

/// Parse a command line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<AppCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "c" | "capture" => AppCommand::Capture,
        "t" | "toggle" => AppCommand::Toggle,
        "s" | "start" => AppCommand::Start,
        "h" | "help" | "?" => AppCommand::Help,
        "q" | "quit" | "exit" => AppCommand::Quit,
        "f" | "file" => {
            if rest.is_empty() {
                return Err("usage: file <path>".to_string());
            }
            AppCommand::File(PathBuf::from(rest))
        }
        other => return Err(format!("commande inconnue '{}' (h pour l'aide)", other)),
    };
    Ok(Some(command))
}

/// Camera session, capturer and server client wired together.
pub struct App<B: CameraBackend> {
    session: CameraSession<B>,
    capturer: FrameCapturer,
    client: CompareClient,
    settings: CompareSettings,
}

impl<B: CameraBackend> App<B> {
    pub fn new(
        session: CameraSession<B>,
        capturer: FrameCapturer,
        client: CompareClient,
        settings: CompareSettings,
    ) -> Self {
        Self {
            session,
            capturer,
            client,
            settings,
        }
    }

    pub fn session(&self) -> &CameraSession<B> {
        &self.session
    }

    pub fn settings(&self) -> &CompareSettings {
        &self.settings
    }

    /// (Re)start the camera with the stored facing preference.
    pub fn start_camera(&mut self) -> Result<(), AppError> {
        let facing = self.session.facing();
        self.start_camera_facing(facing)
    }

    pub fn start_camera_facing(&mut self, facing: Facing) -> Result<(), AppError> {
        self.session.start(facing)?;
        Ok(())
    }

    pub fn toggle_camera(&mut self) -> Result<(), AppError> {
        self.session.toggle()?;
        Ok(())
    }

    /// Grab the current frame and compare it.
    pub async fn capture(&mut self) -> Result<CompareResult, AppError> {
        let stream = self.session.stream().ok_or(AppError::NoCamera)?;
        let frame = wait_for_frame(stream, self.settings.warmup).await?;
        let payload = self.capturer.encode(&frame)?;
        let request = self.settings.request(payload);
        Ok(self.client.compare(&request).await?)
    }

    /// Load an image file and compare it.
    pub async fn compare_file(
        &self,
        path: &std::path::Path,
    ) -> Result<(LoadedImage, CompareResult), AppError> {
        let loaded = load_image(path)?;
        let request = self.settings.request(loaded.payload.clone());
        let result = self.client.compare(&request).await?;
        Ok((loaded, result))
    }

    /// Run one command, returning the text to show, or `None` to quit.
    pub async fn handle(&mut self, command: AppCommand) -> Option<String> {
        let outcome = match command {
            AppCommand::Quit => return None,
            AppCommand::Help => Ok(HELP_TEXT.to_string()),
            AppCommand::Start => self.start_camera().map(|_| self.session.label().to_string()),
            AppCommand::Toggle => self.toggle_camera().map(|_| self.session.label().to_string()),
            AppCommand::Capture => self
                .capture()
                .await
                .map(|result| render_result(&result, &self.settings.render)),
            AppCommand::File(path) => self.compare_file(&path).await.map(|(loaded, result)| {
                format!(
                    "Aperçu: {} ({} octets, {})\n{}",
                    loaded.path.display(),
                    loaded.payload.bytes.len(),
                    loaded.payload.mime,
                    render_result(&result, &self.settings.render)
                )
            }),
        };

        Some(match outcome {
            Ok(text) => text,
            Err(e) => {
                log::error!("Action failed: {:?}", e);
                render_error(e)
            }
        })
    }

    /// Read commands from `input` until EOF or `quit`, writing results to `output`.
    pub async fn run<R, W>(&mut self, mut input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut raw = Vec::new();
        write!(output, "> ")?;
        output.flush()?;

        loop {
            raw.clear();
            if input.read_until(b'\n', &mut raw).await? == 0 {
                break;
            }
            // Invalid UTF-8 is replaced with U+FFFD
            let line = String::from_utf8_lossy(&raw);
            match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(command)) => match self.handle(command).await {
                    Some(text) => writeln!(output, "{}", text.trim_end())?,
                    None => break,
                },
                Err(message) => writeln!(output, "{}", render_error(message))?,
            }
            write!(output, "> ")?;
            output.flush()?;
        }

        self.session.stop();
        Ok(())
    }
}
