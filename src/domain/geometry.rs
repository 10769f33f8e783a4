//! Geometric types for selection regions and coordinates
//!
//! All values are logical (DPR-independent) pixels unless a name says otherwise.

use serde::{Deserialize, Serialize};

/// A point in logical coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to this point
    pub fn delta_from(&self, origin: Point) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height of a container or surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Logical position and size of a rectangle
///
/// Width and height are non-negative once a gesture is finalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// True when either side is zero, i.e. a click rather than a drag
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Check if this rectangle contains a point, inclusive on all four edges
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Clip to `[0, bounds.width] x [0, bounds.height]`
    pub fn clip_to(&self, bounds: Size) -> Rect {
        let left = self.x.max(0.0);
        let top = self.y.max(0.0);
        let right = self.right().min(bounds.width);
        let bottom = self.bottom().min(bounds.height);
        Rect {
            x: left,
            y: top,
            width: (right - left).max(0.0),
            height: (bottom - top).max(0.0),
        }
    }

    /// Scale every component, e.g. logical to device pixels
    pub fn scale(&self, factor: f32) -> Rect {
        Rect {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// A visible OS window as reported by the host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub name: String,
    pub bounds: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_is_inclusive() {
        let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        assert!(rect.contains_point(Point::new(0.0, 0.0)));
        assert!(rect.contains_point(Point::new(200.0, 200.0)));
        assert!(!rect.contains_point(Point::new(200.5, 10.0)));
        assert!(!rect.contains_point(Point::new(10.0, -0.5)));
    }

    #[test]
    fn test_clip_to_container() {
        let rect = Rect::new(-20.0, 10.0, 100.0, 600.0);
        let clipped = rect.clip_to(Size::new(500.0, 500.0));
        assert_eq!(clipped, Rect::new(0.0, 10.0, 80.0, 490.0));
    }

    #[test]
    fn test_clip_outside_container_is_empty() {
        let rect = Rect::new(600.0, 600.0, 10.0, 10.0);
        assert!(rect.clip_to(Size::new(500.0, 500.0)).is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(Rect::new(3.0, 4.0, 0.0, 10.0).is_empty());
        assert!(Rect::new(3.0, 4.0, 10.0, 0.0).is_empty());
        assert!(!Rect::new(3.0, 4.0, 1.0, 1.0).is_empty());
    }
}
