//! Mosaic brush: pixelates the source image inside circular dabs
//!
//! The source bitmap is split into square blocks. The first circle that
//! touches a block fixes the block's color to the average of the source pixels
//! lying in both the block and that circle; later circles reuse the cached
//! color. Painted pixels go to a straight-alpha working buffer which is
//! copied into the destination `Pixmap` on flush.

use std::collections::HashMap;

use anyhow::Context;
use image::{Rgba, RgbaImage};
use tiny_skia::{Color, ColorU8, Pixmap};

use super::geometry::points_in_circle;
use crate::domain::MosaicAnnotation;

/// Block edge in logical pixels, multiplied by the device pixel ratio
pub const BLOCK_SIZE: u32 = 10;

/// Block-averaging mosaic painter bound to one source bitmap
pub struct Mosaic {
    source: RgbaImage,
    /// Paint target, straight alpha
    canvas: RgbaImage,
    surface: Pixmap,
    /// Logical to device pixel ratio
    scale: f32,
    /// Block edge in device pixels
    block: u32,
    cache: HashMap<(u32, u32), [u8; 4]>,
}

impl Mosaic {
    /// Bind a painter to `source`, painting into `surface`
    ///
    /// `block_size` is in logical pixels; both bitmaps must share dimensions.
    pub fn new(
        source: RgbaImage,
        surface: Pixmap,
        scale: f32,
        block_size: u32,
    ) -> anyhow::Result<Self> {
        let (width, height) = source.dimensions();
        if (surface.width(), surface.height()) != (width, height) {
            anyhow::bail!(
                "mosaic surface is {}x{} but source is {}x{}",
                surface.width(),
                surface.height(),
                width,
                height
            );
        }

        let mut raw = Vec::with_capacity(surface.data().len());
        for pixel in surface.pixels() {
            let c = pixel.demultiply();
            raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let canvas =
            RgbaImage::from_raw(width, height, raw).context("mosaic working buffer size")?;

        let block = (block_size as f32 * scale).round().max(1.0) as u32;
        log::debug!(
            "Mosaic bound to {}x{} source, block {}px at scale {}",
            width,
            height,
            block,
            scale
        );

        Ok(Self {
            source,
            canvas,
            surface,
            scale,
            block,
            cache: HashMap::new(),
        })
    }

    /// Paint one pixelated circle centered at logical `(cx, cy)`
    ///
    /// With `flush` false the pixels only reach the working buffer.
    pub fn paint_circle(&mut self, cx: f32, cy: f32, r: f32, flush: bool) {
        let (width, height) = self.source.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let (cx, cy, r) = (cx * self.scale, cy * self.scale, r * self.scale);

        for (x, y) in points_in_circle(cx, cy, r, width - 1, height - 1) {
            let key = (x / self.block, y / self.block);
            let color = match self.cache.get(&key) {
                Some(color) => *color,
                None => {
                    let color = average_block(&self.source, self.block, key, cx, cy, r);
                    self.cache.insert(key, color);
                    color
                }
            };
            self.canvas.put_pixel(x, y, Rgba(color));
        }

        if flush {
            self.flush();
        }
    }

    /// Copy the working buffer into the destination surface
    pub fn flush(&mut self) {
        for (dst, src) in self.surface.pixels_mut().iter_mut().zip(self.canvas.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }

    /// Replay a committed mosaic stroke, then flush
    pub fn paint_shape(&mut self, shape: &MosaicAnnotation) {
        for point in &shape.points {
            self.paint_circle(point.x, point.y, shape.radius, false);
        }
        self.flush();
    }

    /// Erase everything painted so far; cached block colors stay valid
    pub fn clear(&mut self) {
        self.surface.fill(Color::TRANSPARENT);
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    /// Block edge in device pixels
    pub fn block_size(&self) -> u32 {
        self.block
    }

    /// Cached color of block `(column, row)`, if any circle touched it
    pub fn cached_block(&self, column: u32, row: u32) -> Option<[u8; 4]> {
        self.cache.get(&(column, row)).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Average of the source pixels inside both block `key` and the circle
///
/// Integer (floor) average per channel; transparent when nothing qualifies.
fn average_block(
    source: &RgbaImage,
    block: u32,
    (column, row): (u32, u32),
    cx: f32,
    cy: f32,
    r: f32,
) -> [u8; 4] {
    let x0 = column * block;
    let y0 = row * block;
    let x1 = (x0 + block).min(source.width());
    let y1 = (y0 + block).min(source.height());
    let r2 = r * r;

    let mut total = [0u64; 4];
    let mut count = 0u64;
    for y in y0..y1 {
        let dy = y as f32 - cy;
        for x in x0..x1 {
            let dx = x as f32 - cx;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let pixel = source.get_pixel(x, y);
            for (sum, channel) in total.iter_mut().zip(pixel.0) {
                *sum += channel as u64;
            }
            count += 1;
        }
    }

    if count == 0 {
        return [0, 0, 0, 0];
    }
    total.map(|sum| (sum / count) as u8)
}
