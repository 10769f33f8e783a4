//! Host bridge: screenshot source, window enumeration, export sinks
//!
//! The session only talks to the host through [`HostBridge`]. [`LocalBridge`]
//! is the file based host used by the replay binary:
//! - screenshot from an image file
//! - window candidates from a JSON file
//! - clipboard through `arboard`
//! - save into the configured pictures/documents folder

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;

use crate::capture::image::ScreenImage;
use crate::config::SaveLocation;
use crate::domain::WindowInfo;

/// Window name reserved for the overlay itself, never offered as a snap target
pub const OVERLAY_WINDOW_NAME: &str = "pixmark-overlay";

/// Services the capture session needs from its host
#[allow(async_fn_in_trait)]
pub trait HostBridge {
    /// Full captured screenshot
    async fn get_image(&self) -> anyhow::Result<ScreenImage>;

    /// Visible OS windows, excluding the overlay window
    async fn get_windows(&self) -> anyhow::Result<Vec<WindowInfo>>;

    /// Put an encoded PNG on the clipboard
    async fn copy_to_clipboard(&self, png: Vec<u8>) -> anyhow::Result<()>;

    /// Write an encoded PNG into the host's save folder, returning the file path
    async fn save_image_to_folder(&self, png: Vec<u8>) -> anyhow::Result<PathBuf>;

    /// End the session
    fn exit(&self);

    /// Host pixels per logical pixel for window bounds
    fn window_scale(&self) -> f32 {
        1.0
    }
}

/// Generate a timestamped screenshot path inside `dir`
pub fn get_img_path(dir: &Path) -> PathBuf {
    let name = chrono::Local::now()
        .format("Screenshot_%Y-%m-%d_%H-%M-%S.png")
        .to_string();
    dir.join(name)
}

/// Bridge backed by local files and the system clipboard
#[derive(Debug)]
pub struct LocalBridge {
    image_path: PathBuf,
    scale: f32,
    windows_path: Option<PathBuf>,
    window_scale: f32,
    save_location: SaveLocation,
    save_dir: Option<PathBuf>,
    exited: AtomicBool,
}

impl LocalBridge {
    pub fn new(image_path: impl Into<PathBuf>, scale: f32) -> Self {
        Self {
            image_path: image_path.into(),
            scale,
            windows_path: None,
            window_scale: 1.0,
            save_location: SaveLocation::default(),
            save_dir: None,
            exited: AtomicBool::new(false),
        }
    }

    /// Read window candidates from a JSON array of `{name, bounds}`
    pub fn with_windows(mut self, path: impl Into<PathBuf>, window_scale: f32) -> Self {
        self.windows_path = Some(path.into());
        self.window_scale = window_scale;
        self
    }

    pub fn with_save_location(mut self, location: SaveLocation) -> Self {
        self.save_location = location;
        self
    }

    /// Save into `dir` instead of the configured location
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = Some(dir.into());
        self
    }

    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }

    fn save_folder(&self) -> anyhow::Result<PathBuf> {
        match &self.save_dir {
            Some(dir) => Ok(dir.clone()),
            None => self
                .save_location
                .dir()
                .context("no pictures or documents folder available"),
        }
    }
}

impl HostBridge for LocalBridge {
    async fn get_image(&self) -> anyhow::Result<ScreenImage> {
        ScreenImage::open(&self.image_path, self.scale)
    }

    async fn get_windows(&self) -> anyhow::Result<Vec<WindowInfo>> {
        let Some(path) = &self.windows_path else {
            return Ok(Vec::new());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading window list {}", path.display()))?;
        let windows: Vec<WindowInfo> = serde_json::from_str(&json)
            .with_context(|| format!("parsing window list {}", path.display()))?;
        Ok(windows
            .into_iter()
            .filter(|w| w.name != OVERLAY_WINDOW_NAME)
            .collect())
    }

    async fn copy_to_clipboard(&self, png: Vec<u8>) -> anyhow::Result<()> {
        let img = image::load_from_memory(&png)
            .context("decoding exported image")?
            .to_rgba8();
        let mut clipboard = arboard::Clipboard::new().context("opening clipboard")?;
        clipboard
            .set_image(arboard::ImageData {
                width: img.width() as usize,
                height: img.height() as usize,
                bytes: Cow::Borrowed(img.as_raw()),
            })
            .context("setting clipboard image")?;
        log::info!("Copied {}x{} image to clipboard", img.width(), img.height());
        Ok(())
    }

    async fn save_image_to_folder(&self, png: Vec<u8>) -> anyhow::Result<PathBuf> {
        let dir = self.save_folder()?;
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let path = get_img_path(&dir);
        std::fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved screenshot to {}", path.display());
        Ok(path)
    }

    fn exit(&self) {
        log::info!("Session exit requested");
        self.exited.store(true, Ordering::SeqCst);
    }

    fn window_scale(&self) -> f32 {
        self.window_scale
    }
}
