//! Annotation canvas: layered surfaces for the frozen selection
//!
//! Three same-sized device-resolution surfaces are kept:
//! - `base`: the captured pixels under the selection
//! - `mosaic`: pixelated brush strokes, painted immediately
//! - `overlay`: committed vector shapes plus the one being dragged
//!
//! Pointer positions arrive in client (container) coordinates and are turned
//! into canvas-local logical coordinates before any geometry is computed.

use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

use crate::capture::image::ScreenImage;
use crate::config::PixmarkConfig;
use crate::domain::{Annotation, Pen, Point, Rect, ShapeKind};
use crate::render::geometry::{self, interpolate_with_overlap};
use crate::render::image::{
    draw_annotation, draw_annotations_in_order, encode_png, pixmap_from_rgba, rgba_from_pixmap,
};
use crate::render::mosaic::Mosaic;

/// Drawing parameters handed to every new shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSettings {
    pub pen: Pen,
    pub mosaic_radius: f32,
    pub mosaic_overlap: f32,
    /// Logical pixels, scaled by the device pixel ratio
    pub mosaic_block_size: u32,
}

impl From<&PixmarkConfig> for CanvasSettings {
    fn from(config: &PixmarkConfig) -> Self {
        Self {
            pen: config.pen(),
            mosaic_radius: config.mosaic_radius,
            mosaic_overlap: config.mosaic_overlap,
            mosaic_block_size: config.mosaic_block_size,
        }
    }
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self::from(&PixmarkConfig::default())
    }
}

struct Layers {
    base: Pixmap,
    mosaic: Mosaic,
    overlay: Pixmap,
}

/// Owner of the annotation surfaces and the committed shape list
pub struct AnnotationCanvas {
    settings: CanvasSettings,
    /// Device pixels per logical pixel of the installed background
    scale: f32,
    region: Option<Rect>,
    layers: Option<Layers>,
    shapes: Vec<Annotation>,
    current: Option<Annotation>,
    drawing: bool,
    start: Point,
    end: Point,
    /// The in-progress mosaic stroke has touched the mosaic surface
    mosaic_painted: bool,
}

impl AnnotationCanvas {
    pub fn new(settings: CanvasSettings) -> Self {
        Self {
            settings,
            scale: 1.0,
            region: None,
            layers: None,
            shapes: Vec::new(),
            current: None,
            drawing: false,
            start: Point::default(),
            end: Point::default(),
            mosaic_painted: false,
        }
    }

    /// Copy the pixels under `region` into the base surface
    ///
    /// Returns `Ok(false)` without touching anything when `region` is already
    /// installed. A different region starts over with empty surfaces, an empty
    /// shape list and a fresh mosaic cache.
    pub fn install_background(&mut self, image: &ScreenImage, region: Rect) -> anyhow::Result<bool> {
        if self.region == Some(region) && self.layers.is_some() {
            log::debug!("Background for {:?} already installed", region);
            return Ok(false);
        }

        let pixels = image.crop(region)?;
        let (width, height) = pixels.dimensions();
        let base = pixmap_from_rgba(&pixels)?;
        let mosaic_surface = blank_surface(width, height)?;
        let overlay = blank_surface(width, height)?;
        let mosaic = Mosaic::new(
            pixels,
            mosaic_surface,
            image.scale,
            self.settings.mosaic_block_size,
        )?;

        log::info!(
            "Installed {}x{} background for region {:?}",
            width,
            height,
            region
        );
        self.scale = image.scale;
        self.region = Some(region);
        self.layers = Some(Layers {
            base,
            mosaic,
            overlay,
        });
        self.shapes.clear();
        self.drawing = false;
        self.mosaic_painted = false;
        if let Some(kind) = self.tool() {
            self.current = Some(self.fresh_shape(kind));
        }
        Ok(true)
    }

    /// Activate a drawing tool; an unfinished shape of another kind is dropped
    pub fn set_tool(&mut self, kind: ShapeKind) {
        if self.tool() == Some(kind) {
            return;
        }
        if self.drawing {
            self.discard_current();
        }
        log::debug!("Annotation tool set to {:?}", kind);
        self.current = Some(self.fresh_shape(kind));
    }

    pub fn tool(&self) -> Option<ShapeKind> {
        self.current.as_ref().map(Annotation::kind)
    }

    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    pub fn shapes(&self) -> &[Annotation] {
        &self.shapes
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn can_undo(&self) -> bool {
        !self.shapes.is_empty()
    }

    pub fn mosaic(&self) -> Option<&Mosaic> {
        self.layers.as_ref().map(|layers| &layers.mosaic)
    }

    pub fn overlay(&self) -> Option<&Pixmap> {
        self.layers.as_ref().map(|layers| &layers.overlay)
    }

    /// Client position to canvas-local logical position, clamped to the region
    pub fn canvas_pos(&self, client: Point) -> Point {
        let Some(region) = self.region else {
            return Point::default();
        };
        Point::new(
            (client.x - region.x).clamp(0.0, region.width.max(0.0)),
            (client.y - region.y).clamp(0.0, region.height.max(0.0)),
        )
    }

    pub fn pointer_down(&mut self, client: Point) {
        if self.layers.is_none() || self.current.is_none() {
            return;
        }
        let pos = self.canvas_pos(client);
        self.start = pos;
        self.end = pos;
        self.drawing = true;
    }

    pub fn pointer_move(&mut self, client: Point) {
        if !self.drawing {
            return;
        }
        let pos = self.canvas_pos(client);
        self.end = pos;

        let Some(region) = self.region else {
            return;
        };
        let start = self.start;
        let Some(current) = self.current.as_mut() else {
            return;
        };
        match current {
            Annotation::Rect(shape) => {
                shape.rect = geometry::rect_from_points(start, pos, region.width, region.height);
            }
            Annotation::Circle(shape) => {
                shape.ellipse =
                    geometry::ellipse_from_points(start, pos, region.width, region.height);
            }
            Annotation::Path(shape) => {
                if shape.points.is_empty() {
                    shape.points.push(start);
                }
                shape.points.push(pos);
            }
            Annotation::Arrow(shape) => {
                shape.from_x = start.x;
                shape.from_y = start.y;
                shape.to_x = pos.x;
                shape.to_y = pos.y;
            }
            Annotation::Mosaic(shape) => {
                let Some(layers) = self.layers.as_mut() else {
                    return;
                };
                let radius = shape.radius;
                if shape.points.is_empty() {
                    shape.points.push(start);
                    layers.mosaic.paint_circle(start.x, start.y, radius, false);
                }
                let last = shape.points.last().copied().unwrap_or(start);
                for point in
                    interpolate_with_overlap(last, pos, radius, self.settings.mosaic_overlap)
                        .skip(1)
                {
                    layers.mosaic.paint_circle(point.x, point.y, radius, false);
                    shape.points.push(point);
                }
                layers.mosaic.flush();
                self.mosaic_painted = true;
                return;
            }
        }
        self.render_all();
    }

    /// Finish the gesture: a drag commits the shape, a click discards it
    ///
    /// Returns true when a shape was committed.
    pub fn pointer_up(&mut self) -> bool {
        if !self.drawing {
            return false;
        }
        self.drawing = false;
        let Some(kind) = self.tool() else {
            return false;
        };

        if self.start == self.end {
            self.discard_current();
            self.render_all();
            return false;
        }

        let fresh = self.fresh_shape(kind);
        if let Some(shape) = self.current.replace(fresh) {
            log::debug!("Committed {:?} annotation {}", kind, shape.id());
            self.shapes.push(shape);
        }
        self.mosaic_painted = false;
        self.render_all();
        true
    }

    /// Repaint the overlay from the committed shapes plus the live preview
    pub fn render_all(&mut self) {
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        layers.overlay.fill(Color::TRANSPARENT);
        draw_annotations_in_order(&mut layers.overlay, &self.shapes, self.scale);
        if self.drawing
            && self.start != self.end
            && let Some(current) = &self.current
        {
            draw_annotation(&mut layers.overlay, current, self.scale);
        }
    }

    /// Remove the last committed shape
    pub fn undo(&mut self) -> bool {
        let Some(shape) = self.shapes.pop() else {
            return false;
        };
        log::debug!("Undo {:?} annotation {}", shape.kind(), shape.id());
        if shape.is_mosaic() {
            self.rebuild_mosaic();
        }
        self.render_all();
        true
    }

    /// Composite base, mosaic and overlay at device resolution
    pub fn composite(&self) -> anyhow::Result<image::RgbaImage> {
        let Some(layers) = self.layers.as_ref() else {
            anyhow::bail!("no background installed");
        };
        let mut result = layers.base.clone();
        let paint = PixmapPaint::default();
        result.draw_pixmap(
            0,
            0,
            layers.mosaic.surface().as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
        result.draw_pixmap(
            0,
            0,
            layers.overlay.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
        rgba_from_pixmap(&result)
    }

    /// Composited result encoded as PNG
    pub fn export_png(&self) -> anyhow::Result<Vec<u8>> {
        encode_png(&self.composite()?)
    }

    fn fresh_shape(&self, kind: ShapeKind) -> Annotation {
        Annotation::new(kind, self.settings.pen, self.settings.mosaic_radius)
    }

    fn discard_current(&mut self) {
        self.drawing = false;
        if let Some(kind) = self.tool() {
            self.current = Some(self.fresh_shape(kind));
        }
        if self.mosaic_painted {
            self.rebuild_mosaic();
        }
    }

    fn rebuild_mosaic(&mut self) {
        self.mosaic_painted = false;
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        layers.mosaic.clear();
        for shape in &self.shapes {
            if let Annotation::Mosaic(stroke) = shape {
                layers.mosaic.paint_shape(stroke);
            }
        }
    }
}

fn blank_surface(width: u32, height: u32) -> anyhow::Result<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("cannot create {}x{} surface", width, height))
}
