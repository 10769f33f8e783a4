//! Annotation types for drawing on the selected region
//!
//! All annotation types store coordinates in canvas-local logical coordinates,
//! i.e. relative to the top-left corner of the selection.

use uuid::Uuid;

use super::geometry::{Point, Rect};
use crate::config::ShapeColor;

/// Default stroke width of a fresh pen in logical pixels
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

/// Default mosaic brush radius in logical pixels
pub const DEFAULT_MOSAIC_RADIUS: f32 = 10.0;

/// Annotation tool kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
    Path,
    Arrow,
    Mosaic,
}

/// Stroke settings for vector annotations
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pen {
    pub color: ShapeColor,
    pub line_width: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: ShapeColor::RED,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// Ellipse parameters derived from two dragged corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ellipse {
    pub center_x: f32,
    pub center_y: f32,
    pub radius_x: f32,
    pub radius_y: f32,
    /// Width and height differ by less than 2px
    pub is_circle: bool,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Outline rectangle annotation (no fill)
#[derive(Clone, Debug, PartialEq)]
pub struct RectAnnotation {
    pub id: Uuid,
    pub rect: Rect,
    pub pen: Pen,
}

/// Outline circle/ellipse annotation (no fill)
#[derive(Clone, Debug, PartialEq)]
pub struct CircleAnnotation {
    pub id: Uuid,
    pub ellipse: Ellipse,
    pub pen: Pen,
}

/// Freehand polyline annotation
#[derive(Clone, Debug, PartialEq)]
pub struct PathAnnotation {
    pub id: Uuid,
    pub points: Vec<Point>,
    pub pen: Pen,
}

/// Arrow annotation with a filled head at the `to` end
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrowAnnotation {
    pub id: Uuid,
    pub from_x: f32,
    pub from_y: f32,
    pub to_x: f32,
    pub to_y: f32,
    pub pen: Pen,
}

/// Mosaic brush stroke: every point is the center of one pixelated circle
#[derive(Clone, Debug, PartialEq)]
pub struct MosaicAnnotation {
    pub id: Uuid,
    pub points: Vec<Point>,
    pub radius: f32,
}

/// Unified annotation type, replayed in order on every repaint
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Rect(RectAnnotation),
    Circle(CircleAnnotation),
    Path(PathAnnotation),
    Arrow(ArrowAnnotation),
    Mosaic(MosaicAnnotation),
}

impl Annotation {
    /// Fresh annotation of `kind` with zeroed geometry
    ///
    /// `pen` is ignored for mosaic strokes, `mosaic_radius` for everything else.
    pub fn new(kind: ShapeKind, pen: Pen, mosaic_radius: f32) -> Self {
        let id = Uuid::new_v4();
        match kind {
            ShapeKind::Rect => Annotation::Rect(RectAnnotation {
                id,
                rect: Rect::default(),
                pen,
            }),
            ShapeKind::Circle => Annotation::Circle(CircleAnnotation {
                id,
                ellipse: Ellipse::default(),
                pen,
            }),
            ShapeKind::Path => Annotation::Path(PathAnnotation {
                id,
                points: Vec::new(),
                pen,
            }),
            ShapeKind::Arrow => Annotation::Arrow(ArrowAnnotation {
                id,
                pen,
                ..Default::default()
            }),
            ShapeKind::Mosaic => Annotation::Mosaic(MosaicAnnotation {
                id,
                points: Vec::new(),
                radius: mosaic_radius,
            }),
        }
    }

    /// Fresh annotation with the default red 2px pen and default mosaic radius
    pub fn with_defaults(kind: ShapeKind) -> Self {
        Self::new(kind, Pen::default(), DEFAULT_MOSAIC_RADIUS)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Annotation::Rect(_) => ShapeKind::Rect,
            Annotation::Circle(_) => ShapeKind::Circle,
            Annotation::Path(_) => ShapeKind::Path,
            Annotation::Arrow(_) => ShapeKind::Arrow,
            Annotation::Mosaic(_) => ShapeKind::Mosaic,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Annotation::Rect(a) => a.id,
            Annotation::Circle(a) => a.id,
            Annotation::Path(a) => a.id,
            Annotation::Arrow(a) => a.id,
            Annotation::Mosaic(a) => a.id,
        }
    }

    pub fn pen(&self) -> Option<&Pen> {
        match self {
            Annotation::Rect(a) => Some(&a.pen),
            Annotation::Circle(a) => Some(&a.pen),
            Annotation::Path(a) => Some(&a.pen),
            Annotation::Arrow(a) => Some(&a.pen),
            Annotation::Mosaic(_) => None,
        }
    }

    /// Mosaic strokes live on their own layer, not the vector overlay
    pub fn is_mosaic(&self) -> bool {
        matches!(self, Annotation::Mosaic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_red_two_pixel_pen() {
        for kind in [
            ShapeKind::Rect,
            ShapeKind::Circle,
            ShapeKind::Path,
            ShapeKind::Arrow,
        ] {
            let shape = Annotation::with_defaults(kind);
            assert_eq!(shape.kind(), kind);
            let pen = shape.pen().expect("vector shapes carry a pen");
            assert_eq!(pen.color.to_rgba_u8(), [255, 0, 0, 255]);
            assert_eq!(pen.line_width, 2.0);
        }
    }

    #[test]
    fn test_mosaic_has_radius_and_no_pen() {
        let shape = Annotation::with_defaults(ShapeKind::Mosaic);
        assert!(shape.pen().is_none());
        assert!(shape.is_mosaic());
        match shape {
            Annotation::Mosaic(m) => {
                assert_eq!(m.radius, DEFAULT_MOSAIC_RADIUS);
                assert!(m.points.is_empty());
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Annotation::with_defaults(ShapeKind::Rect);
        let b = Annotation::with_defaults(ShapeKind::Rect);
        assert_ne!(a.id(), b.id());
    }
}
