//! Shared geometry calculations for selection and annotations
//!
//! Everything here is a pure function of plain numeric inputs. The selection
//! controller, the annotation canvas and the mosaic engine all build on it.

use crate::domain::{Ellipse, HitTarget, Point, Rect, ResizeHandle, Size};

/// Fraction of a brush diameter two consecutive mosaic dabs overlap by
pub const MOSAIC_OVERLAP: f32 = 0.3;

/// Arrow geometry constants
pub mod arrow {
    /// Arrowhead length in logical pixels
    pub const HEAD_LENGTH: f32 = 20.0;
    /// Angle between the shaft and each side of the head (15 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::PI / 12.0;
    /// How far the shaft reaches back into the head so the joint has no gap
    pub const SHAFT_OVERLAP: f32 = 2.0;
}

/// Resize handle hit areas
pub mod handle {
    /// Side of the square grab area centered on each corner
    pub const CORNER_DIAMETER: f32 = 16.0;
    /// Thickness of the grab band centered on each edge
    pub const EDGE_GRAB_THICKNESS: f32 = 8.0;
}

/// Shape (rectangle/ellipse) geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Canonical rectangle for a drag vector of arbitrary sign
///
/// Width and height are clamped to `max_x`/`max_y`. Only the magnitude is
/// clamped: a start point near the container edge can still yield a rectangle
/// reaching past it.
pub fn rect_from_drag(
    start_x: f32,
    start_y: f32,
    move_x: f32,
    move_y: f32,
    max_x: f32,
    max_y: f32,
) -> Rect {
    let (x, width) = if move_x >= 0.0 {
        (start_x, max_x.min(move_x))
    } else {
        (start_x + move_x, max_x.min(-move_x))
    };
    let (y, height) = if move_y >= 0.0 {
        (start_y, max_y.min(move_y))
    } else {
        (start_y + move_y, max_y.min(-move_y))
    };
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Point of `rect` that stays put while `handle` is dragged
pub fn fixed_point_for_handle(handle: ResizeHandle, rect: Rect) -> Point {
    match handle {
        ResizeHandle::NW => Point::new(rect.right(), rect.bottom()),
        ResizeHandle::N | ResizeHandle::NE => Point::new(rect.x, rect.bottom()),
        ResizeHandle::E | ResizeHandle::SE | ResizeHandle::S => Point::new(rect.x, rect.y),
        ResizeHandle::SW | ResizeHandle::W => Point::new(rect.right(), rect.y),
    }
}

/// Rectangle produced by dragging `handle` by `(move_x, move_y)`
///
/// The pointer delta is turned into a drag vector anchored at the fixed point;
/// edge handles keep the other axis at its original size.
#[allow(clippy::too_many_arguments)]
pub fn rect_for_resize(
    handle: ResizeHandle,
    fixed: Point,
    origin_width: f32,
    origin_height: f32,
    move_x: f32,
    move_y: f32,
    max_x: f32,
    max_y: f32,
) -> Rect {
    let (drag_x, drag_y) = match handle {
        ResizeHandle::NW => (move_x - origin_width, move_y - origin_height),
        ResizeHandle::N => (origin_width, move_y - origin_height),
        ResizeHandle::NE => (move_x + origin_width, move_y - origin_height),
        ResizeHandle::E => (move_x + origin_width, origin_height),
        ResizeHandle::SE => (move_x + origin_width, move_y + origin_height),
        ResizeHandle::S => (origin_width, move_y + origin_height),
        ResizeHandle::SW => (move_x - origin_width, move_y + origin_height),
        ResizeHandle::W => (move_x - origin_width, origin_height),
    };
    rect_from_drag(fixed.x, fixed.y, drag_x, drag_y, max_x, max_y)
}

/// Ellipse inscribed in the box spanned by two points
///
/// The right/bottom edges are clamped to `max_x`/`max_y`.
pub fn ellipse_from_points(p1: Point, p2: Point, max_x: f32, max_y: f32) -> Ellipse {
    let left = p1.x.min(p2.x);
    let right = p1.x.max(p2.x).min(max_x);
    let top = p1.y.min(p2.y);
    let bottom = p1.y.max(p2.y).min(max_y);

    let width = right - left;
    let height = bottom - top;

    Ellipse {
        center_x: left + width / 2.0,
        center_y: top + height / 2.0,
        radius_x: width / 2.0,
        radius_y: height / 2.0,
        is_circle: (width - height).abs() < 2.0,
        left,
        top,
        width,
        height,
    }
}

/// Rectangle spanned by two points, right/bottom clamped to the bounds
pub fn rect_from_points(p1: Point, p2: Point, max_x: f32, max_y: f32) -> Rect {
    let left = p1.x.min(p2.x);
    let right = p1.x.max(p2.x).min(max_x);
    let top = p1.y.min(p2.y);
    let bottom = p1.y.max(p2.y).min(max_y);
    Rect {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    }
}

/// Integer grid points inside a circle
///
/// Yields every `(x, y)` with `0 <= x <= max_x`, `0 <= y <= max_y` and
/// `(x - cx)^2 + (y - cy)^2 <= r^2`, row by row. Only the circle's bounding
/// square intersected with the bounds is visited.
#[derive(Clone, Debug)]
pub struct CirclePoints {
    cx: f32,
    cy: f32,
    r2: f32,
    x0: i64,
    x1: i64,
    y1: i64,
    x: i64,
    y: i64,
}

pub fn points_in_circle(cx: f32, cy: f32, r: f32, max_x: u32, max_y: u32) -> CirclePoints {
    let x0 = (cx - r).ceil().max(0.0) as i64;
    let x1 = ((cx + r).floor() as i64).min(max_x as i64);
    let y0 = (cy - r).ceil().max(0.0) as i64;
    let y1 = ((cy + r).floor() as i64).min(max_y as i64);
    CirclePoints {
        cx,
        cy,
        r2: r * r,
        x0,
        x1,
        y1,
        x: x0,
        y: y0,
    }
}

impl Iterator for CirclePoints {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.y <= self.y1 {
            let dy = self.y as f32 - self.cy;
            let dy2 = dy * dy;
            while self.x <= self.x1 {
                let x = self.x;
                self.x += 1;
                let dx = x as f32 - self.cx;
                if dx * dx + dy2 <= self.r2 {
                    return Some((x as u32, self.y as u32));
                }
            }
            self.x = self.x0;
            self.y += 1;
        }
        None
    }
}

/// Evenly spaced points from `from` to `to` for a brush of `radius`
///
/// Consecutive points are at most `2 * radius * (1 - overlap)` apart. At least
/// two interior samples are produced and `to` is always the last point.
#[derive(Clone, Debug)]
pub struct Interpolation {
    from: Point,
    to: Point,
    count: usize,
    index: usize,
}

pub fn interpolate(from: Point, to: Point, radius: f32) -> Interpolation {
    interpolate_with_overlap(from, to, radius, MOSAIC_OVERLAP)
}

pub fn interpolate_with_overlap(from: Point, to: Point, radius: f32, overlap: f32) -> Interpolation {
    let distance = from.distance(to);
    let step = 2.0 * radius * (1.0 - overlap);
    let steps = if step > 0.0 && step.is_finite() && distance.is_finite() {
        (distance / step).ceil() as usize
    } else {
        0
    };
    Interpolation {
        from,
        to,
        count: steps.max(2),
        index: 0,
    }
}

impl Iterator for Interpolation {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let index = self.index;
        if index > self.count {
            return None;
        }
        self.index += 1;
        if index == self.count {
            return Some(self.to);
        }
        let t = index as f32 / self.count as f32;
        Some(Point::new(
            self.from.x + (self.to.x - self.from.x) * t,
            self.from.y + (self.to.y - self.from.y) * t,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count + 1).saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Interpolation {}

/// First window, in supplied order, whose bounds contain `point`
pub fn match_window(point: Point, windows: &[Rect]) -> Option<&Rect> {
    windows.iter().find(|window| window.contains_point(point))
}

/// Host window bounds as a logical rectangle inside the container
///
/// `host_scale` is the ratio between the host's window coordinates and
/// logical pixels (1.0 when the host already reports logical pixels).
pub fn rect_for_window(bounds: Rect, host_scale: f32, container: Size) -> Rect {
    let scale = if host_scale > 0.0 { host_scale } else { 1.0 };
    bounds.scale(1.0 / scale).clip_to(container)
}

fn over(point: Point, x: f32, y: f32, width: f32, height: f32) -> bool {
    point.x >= x && point.x < x + width && point.y >= y && point.y < y + height
}

/// Classify `point` against the selection: handle, body or outside
///
/// Handles are layered above the body, corners above edges.
pub fn hit_test(selection: Rect, point: Point) -> HitTarget {
    use handle::{CORNER_DIAMETER, EDGE_GRAB_THICKNESS};

    if selection.is_empty() {
        return HitTarget::Outside;
    }

    let half_corner = CORNER_DIAMETER / 2.0;
    let corners = [
        (ResizeHandle::NW, selection.x, selection.y),
        (ResizeHandle::NE, selection.right(), selection.y),
        (ResizeHandle::SW, selection.x, selection.bottom()),
        (ResizeHandle::SE, selection.right(), selection.bottom()),
    ];
    for (handle, cx, cy) in corners {
        if over(
            point,
            cx - half_corner,
            cy - half_corner,
            CORNER_DIAMETER,
            CORNER_DIAMETER,
        ) {
            return HitTarget::Handle(handle);
        }
    }

    let half_edge = EDGE_GRAB_THICKNESS / 2.0;
    let edges = [
        (
            ResizeHandle::N,
            (selection.x, selection.y - half_edge),
            (selection.width, EDGE_GRAB_THICKNESS),
        ),
        (
            ResizeHandle::S,
            (selection.x, selection.bottom() - half_edge),
            (selection.width, EDGE_GRAB_THICKNESS),
        ),
        (
            ResizeHandle::W,
            (selection.x - half_edge, selection.y),
            (EDGE_GRAB_THICKNESS, selection.height),
        ),
        (
            ResizeHandle::E,
            (selection.right() - half_edge, selection.y),
            (EDGE_GRAB_THICKNESS, selection.height),
        ),
    ];
    for (handle, (x, y), (w, h)) in edges {
        if over(point, x, y, w, h) {
            return HitTarget::Handle(handle);
        }
    }

    if selection.contains_point(point) {
        HitTarget::Body
    } else {
        HitTarget::Outside
    }
}

/// Shaft and head of an arrow drawn from `from` to `to`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowGeometry {
    /// Where the shaft stroke ends, slightly inside the head
    pub shaft_end: Point,
    /// Filled head triangle: tip, then the two back corners
    pub head: [Point; 3],
}

/// Arrow shaft and head, with the head shortened on short arrows
///
/// Returns None for a zero-length arrow.
pub fn arrow_geometry(from: Point, to: Point) -> Option<ArrowGeometry> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 || !length.is_finite() {
        return None;
    }

    let angle = dy.atan2(dx);
    let head_length = arrow::HEAD_LENGTH.min(length * 0.5);

    let shaft_end = Point::new(
        to.x - angle.cos() * (head_length - arrow::SHAFT_OVERLAP),
        to.y - angle.sin() * (head_length - arrow::SHAFT_OVERLAP),
    );
    let side1 = Point::new(
        to.x - head_length * (angle - arrow::HEAD_ANGLE).cos(),
        to.y - head_length * (angle - arrow::HEAD_ANGLE).sin(),
    );
    let side2 = Point::new(
        to.x - head_length * (angle + arrow::HEAD_ANGLE).cos(),
        to.y - head_length * (angle + arrow::HEAD_ANGLE).sin(),
    );

    Some(ArrowGeometry {
        shaft_end,
        head: [to, side1, side2],
    })
}
