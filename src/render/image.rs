//! Shape rendering using tiny-skia and PNG encoding
//!
//! Shapes are stored in canvas-local logical coordinates; every draw call
//! takes the device pixel ratio and applies it as a transform, so stroke
//! widths scale together with the geometry.

use std::io;

use anyhow::Context;
use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use super::geometry::{self, shape};
use crate::domain::{
    Annotation, ArrowAnnotation, CircleAnnotation, PathAnnotation, Pen, Point, RectAnnotation,
};

/// Premultiplied copy of a straight-alpha image
pub fn pixmap_from_rgba(img: &RgbaImage) -> anyhow::Result<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())
        .with_context(|| format!("creating {}x{} surface", img.width(), img.height()))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Straight-alpha copy of a surface
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> anyhow::Result<RgbaImage> {
    let mut raw = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .context("surface buffer does not match its dimensions")
}

fn pen_paint(pen: &Pen) -> Paint<'static> {
    let [r, g, b, a] = pen.color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn pen_stroke(pen: &Pen) -> Stroke {
    Stroke {
        width: pen.line_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.close();
    pb.finish()
}

fn build_polyline(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for point in rest {
        pb.line_to(point.x, point.y);
    }
    pb.finish()
}

/// Stroked rectangle outline
pub fn draw_rect(pixmap: &mut Pixmap, shape: &RectAnnotation, scale: f32) {
    if shape.rect.width == 0.0 && shape.rect.height == 0.0 {
        return;
    }
    let Some(rect) = tiny_skia::Rect::from_xywh(
        shape.rect.x,
        shape.rect.y,
        shape.rect.width,
        shape.rect.height,
    ) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    pixmap.stroke_path(
        &path,
        &pen_paint(&shape.pen),
        &pen_stroke(&shape.pen),
        Transform::from_scale(scale, scale),
        None,
    );
}

/// Stroked ellipse outline
pub fn draw_circle(pixmap: &mut Pixmap, shape: &CircleAnnotation, scale: f32) {
    let e = &shape.ellipse;
    if e.radius_x == 0.0 && e.radius_y == 0.0 {
        return;
    }
    let Some(path) = build_ellipse_path(e.center_x, e.center_y, e.radius_x, e.radius_y) else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &pen_paint(&shape.pen),
        &pen_stroke(&shape.pen),
        Transform::from_scale(scale, scale),
        None,
    );
}

/// Stroked polyline; fewer than two points draw nothing
pub fn draw_path(pixmap: &mut Pixmap, shape: &PathAnnotation, scale: f32) {
    if shape.points.len() < 2 {
        return;
    }
    let Some(path) = build_polyline(&shape.points) else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &pen_paint(&shape.pen),
        &pen_stroke(&shape.pen),
        Transform::from_scale(scale, scale),
        None,
    );
}

/// Shaft line plus filled triangular head
pub fn draw_arrow(pixmap: &mut Pixmap, shape: &ArrowAnnotation, scale: f32) {
    let Some(arrow) = geometry::arrow_geometry(
        Point::new(shape.from_x, shape.from_y),
        Point::new(shape.to_x, shape.to_y),
    ) else {
        return;
    };
    let transform = Transform::from_scale(scale, scale);
    let paint = pen_paint(&shape.pen);

    let mut pb = PathBuilder::new();
    pb.move_to(shape.from_x, shape.from_y);
    pb.line_to(arrow.shaft_end.x, arrow.shaft_end.y);
    if let Some(shaft) = pb.finish() {
        pixmap.stroke_path(&shaft, &paint, &pen_stroke(&shape.pen), transform, None);
    }

    let [tip, side1, side2] = arrow.head;
    let mut pb = PathBuilder::new();
    pb.move_to(tip.x, tip.y);
    pb.line_to(side1.x, side1.y);
    pb.line_to(side2.x, side2.y);
    pb.close();
    if let Some(head) = pb.finish() {
        pixmap.fill_path(&head, &paint, FillRule::Winding, transform, None);
    }
}

/// Draw one vector shape; mosaic strokes live on their own layer and are skipped
pub fn draw_annotation(pixmap: &mut Pixmap, annotation: &Annotation, scale: f32) {
    match annotation {
        Annotation::Rect(shape) => draw_rect(pixmap, shape, scale),
        Annotation::Circle(shape) => draw_circle(pixmap, shape, scale),
        Annotation::Path(shape) => draw_path(pixmap, shape, scale),
        Annotation::Arrow(shape) => draw_arrow(pixmap, shape, scale),
        Annotation::Mosaic(_) => {}
    }
}

/// Draw vector shapes in order, later shapes on top
pub fn draw_annotations_in_order(pixmap: &mut Pixmap, annotations: &[Annotation], scale: f32) {
    for annotation in annotations {
        draw_annotation(pixmap, annotation, scale);
    }
}

pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Encode an image as an in-memory PNG
pub fn encode_png(image: &RgbaImage) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_png(&mut bytes, image).context("encoding PNG")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Annotation, Ellipse, Rect, ShapeKind};
    use crate::render::geometry::ellipse_from_points;

    fn alpha(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).unwrap().alpha()
    }

    #[test]
    fn test_rect_outline_is_not_filled() {
        let mut pixmap = Pixmap::new(50, 50).unwrap();
        let mut shape = Annotation::with_defaults(ShapeKind::Rect);
        if let Annotation::Rect(r) = &mut shape {
            r.rect = Rect::new(10.0, 10.0, 30.0, 30.0);
        }
        draw_annotation(&mut pixmap, &shape, 1.0);

        let edge = pixmap.pixel(10, 25).unwrap().demultiply();
        assert!(edge.alpha() > 0);
        assert!(edge.red() > edge.green());
        assert_eq!(alpha(&pixmap, 25, 25), 0);
    }

    #[test]
    fn test_rect_scales_with_device_ratio() {
        let mut pixmap = Pixmap::new(100, 100).unwrap();
        let mut shape = Annotation::with_defaults(ShapeKind::Rect);
        if let Annotation::Rect(r) = &mut shape {
            r.rect = Rect::new(10.0, 10.0, 30.0, 30.0);
        }
        draw_annotation(&mut pixmap, &shape, 2.0);
        assert!(alpha(&pixmap, 20, 50) > 0);
        assert_eq!(alpha(&pixmap, 10, 25), 0);
    }

    #[test]
    fn test_ellipse_outline() {
        let mut pixmap = Pixmap::new(60, 60).unwrap();
        let shape = Annotation::Circle(CircleAnnotation {
            id: uuid::Uuid::new_v4(),
            ellipse: ellipse_from_points(
                Point::new(10.0, 10.0),
                Point::new(50.0, 50.0),
                60.0,
                60.0,
            ),
            pen: Pen::default(),
        });
        draw_annotation(&mut pixmap, &shape, 1.0);
        assert!(alpha(&pixmap, 30, 10) > 0);
        assert_eq!(alpha(&pixmap, 30, 30), 0);
        assert_eq!(alpha(&pixmap, 11, 11), 0);
    }

    #[test]
    fn test_degenerate_shapes_draw_nothing() {
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let shapes = [
            Annotation::Path(PathAnnotation {
                id: uuid::Uuid::new_v4(),
                points: vec![Point::new(5.0, 5.0)],
                pen: Pen::default(),
            }),
            Annotation::with_defaults(ShapeKind::Arrow),
            Annotation::with_defaults(ShapeKind::Rect),
            Annotation::Circle(CircleAnnotation {
                id: uuid::Uuid::new_v4(),
                ellipse: Ellipse::default(),
                pen: Pen::default(),
            }),
        ];
        draw_annotations_in_order(&mut pixmap, &shapes, 1.0);
        assert!(pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_arrow_head_is_filled() {
        let mut pixmap = Pixmap::new(120, 40).unwrap();
        let shape = Annotation::Arrow(ArrowAnnotation {
            id: uuid::Uuid::new_v4(),
            from_x: 10.0,
            from_y: 20.0,
            to_x: 110.0,
            to_y: 20.0,
            pen: Pen::default(),
        });
        draw_annotation(&mut pixmap, &shape, 1.0);
        // inside the head, off the shaft line
        assert!(alpha(&pixmap, 100, 18) > 0);
        assert!(alpha(&pixmap, 50, 20) > 0);
        assert_eq!(alpha(&pixmap, 50, 10), 0);
    }

    #[test]
    fn test_pixmap_roundtrip_keeps_opaque_pixels() {
        let img = RgbaImage::from_fn(4, 3, |x, y| image::Rgba([x as u8 * 40, y as u8 * 60, 7, 255]));
        let back = rgba_from_pixmap(&pixmap_from_rgba(&img).unwrap()).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_encode_png_decodes() {
        let img = RgbaImage::from_pixel(7, 5, image::Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }
}
