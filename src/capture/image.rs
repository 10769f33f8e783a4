//! Screenshot image type for captured screenshots

use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::domain::{Rect, Size};

/// A captured screenshot: raw RGBA pixels plus the device pixel ratio
#[derive(Clone, Debug)]
pub struct ScreenImage {
    pub rgba: RgbaImage,
    /// Device pixels per logical pixel
    pub scale: f32,
}

impl ScreenImage {
    /// Wrap a raw RGBA buffer as delivered by the host
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>, scale: f32) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            anyhow::bail!(
                "screenshot buffer has {} bytes, {}x{} RGBA needs {}",
                pixels.len(),
                width,
                height,
                expected
            );
        }
        let rgba = RgbaImage::from_raw(width, height, pixels)
            .context("screenshot buffer does not match its dimensions")?;
        Ok(Self::new(rgba, scale))
    }

    pub fn new(rgba: RgbaImage, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        log::debug!(
            "ScreenImage captured: {}x{} pixels at scale {}",
            rgba.width(),
            rgba.height(),
            scale
        );
        Self { rgba, scale }
    }

    /// Decode an image file (PNG, JPEG, ...) into a screenshot
    pub fn open(path: &Path, scale: f32) -> anyhow::Result<Self> {
        let rgba = image::open(path)
            .with_context(|| format!("opening screenshot {}", path.display()))?
            .to_rgba8();
        Ok(Self::new(rgba, scale))
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Size of the overlay container in logical pixels
    pub fn logical_size(&self) -> Size {
        Size::new(
            self.width() as f32 / self.scale,
            self.height() as f32 / self.scale,
        )
    }

    /// Copy of the pixels under a logical region, at device resolution
    ///
    /// The region is clipped to the screenshot. Any part left on it yields
    /// at least one pixel per side, so sub-pixel slivers still crop.
    pub fn crop(&self, region: Rect) -> anyhow::Result<RgbaImage> {
        let bounds = Size::new(self.width() as f32, self.height() as f32);
        let device = region.scale(self.scale).clip_to(bounds);
        if device.is_empty() {
            anyhow::bail!(
                "region {:?} covers no pixels of the {}x{} screenshot",
                region,
                self.width(),
                self.height()
            );
        }
        let x = (device.x.round() as u32).min(self.width() - 1);
        let y = (device.y.round() as u32).min(self.height() - 1);
        let width = (device.width.round() as u32).max(1).min(self.width() - x);
        let height = (device.height.round() as u32).max(1).min(self.height() - y);
        Ok(image::imageops::crop_imm(&self.rgba, x, y, width, height).to_image())
    }
}
