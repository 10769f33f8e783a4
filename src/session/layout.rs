//! Placement of the size label and the edit toolbar around the selection

use crate::domain::{Point, Rect};

/// Height of the edit toolbar in logical pixels
pub const EDIT_TOOL_HEIGHT: f32 = 40.0;
/// Gap between the selection and the edit toolbar
pub const EDIT_TOOL_GAP: f32 = 8.0;
/// Height of the size label in logical pixels
pub const SIZE_DISPLAY_HEIGHT: f32 = 20.0;
/// Gap between the selection and the size label
pub const SIZE_DISPLAY_GAP: f32 = 8.0;

/// Selection size in device pixels, e.g. `"200 x 100"`
///
/// None for an empty selection, where the label is hidden.
pub fn size_label(selection: Rect, scale: f32) -> Option<String> {
    if selection.width == 0.0 && selection.height == 0.0 {
        return None;
    }
    Some(format!(
        "{} x {}",
        (selection.width * scale).round(),
        (selection.height * scale).round()
    ))
}

/// Top-left corner of the size label: above the selection, or just inside
/// its top edge when there is no room above
pub fn size_label_anchor(selection: Rect) -> Point {
    let above = selection.y - SIZE_DISPLAY_HEIGHT - SIZE_DISPLAY_GAP;
    if above < 0.0 {
        Point::new(selection.x, selection.y + SIZE_DISPLAY_GAP)
    } else {
        Point::new(selection.x, above)
    }
}

/// Top-left corner of a toolbar `toolbar_width` wide, right-aligned with the
/// selection
///
/// Below the selection when it fits in `max_y`, else above it, else inside
/// along the bottom edge.
pub fn toolbar_anchor(selection: Rect, toolbar_width: f32, max_y: f32) -> Point {
    let left = selection.right() - toolbar_width;
    let top = if selection.bottom() + EDIT_TOOL_HEIGHT + EDIT_TOOL_GAP <= max_y {
        selection.bottom() + EDIT_TOOL_GAP
    } else if selection.y - EDIT_TOOL_HEIGHT - EDIT_TOOL_GAP >= 0.0 {
        selection.y - EDIT_TOOL_HEIGHT - EDIT_TOOL_GAP
    } else {
        selection.bottom() - EDIT_TOOL_HEIGHT - EDIT_TOOL_GAP
    };
    Point::new(left, top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_label_uses_device_pixels() {
        let sel = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(size_label(sel, 2.0).as_deref(), Some("200 x 100"));
        assert_eq!(size_label(sel, 1.0).as_deref(), Some("100 x 50"));
        assert_eq!(size_label(Rect::default(), 2.0), None);
    }

    #[test]
    fn test_size_label_flips_inside_near_top() {
        assert_eq!(
            size_label_anchor(Rect::new(10.0, 100.0, 50.0, 50.0)),
            Point::new(10.0, 72.0)
        );
        assert_eq!(
            size_label_anchor(Rect::new(10.0, 20.0, 50.0, 50.0)),
            Point::new(10.0, 28.0)
        );
    }

    #[test]
    fn test_toolbar_below_above_inside() {
        let below = toolbar_anchor(Rect::new(100.0, 100.0, 200.0, 100.0), 120.0, 500.0);
        assert_eq!(below, Point::new(180.0, 208.0));

        let above = toolbar_anchor(Rect::new(100.0, 300.0, 200.0, 180.0), 120.0, 500.0);
        assert_eq!(above, Point::new(180.0, 252.0));

        let inside = toolbar_anchor(Rect::new(0.0, 10.0, 500.0, 480.0), 120.0, 500.0);
        assert_eq!(inside, Point::new(380.0, 442.0));
    }
}
