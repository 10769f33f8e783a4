//! Selection types for the capture overlay

use serde::{Deserialize, Serialize};

/// Interaction mode of the selection controller
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Choosing a region by drag or by snapping to a window
    #[default]
    Select,
    /// A region exists and can be resized, moved or annotated
    WaitEdit,
    /// Dragging one of the eight resize handles
    Resizing,
    /// Annotating the frozen region
    Edit,
    /// Dragging the whole region
    Move,
}

/// Resize handles on the selection border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    /// North-West corner
    NW,
    /// North edge
    N,
    /// North-East corner
    NE,
    /// East edge
    E,
    /// South-East corner
    SE,
    /// South edge
    S,
    /// South-West corner
    SW,
    /// West edge
    W,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
    ];

    /// Native resize cursor shown while this handle is grabbed
    pub fn cursor(self) -> Cursor {
        match self {
            ResizeHandle::NW | ResizeHandle::SE => Cursor::ResizeNwse,
            ResizeHandle::NE | ResizeHandle::SW => Cursor::ResizeNesw,
            ResizeHandle::N | ResizeHandle::S => Cursor::ResizeNs,
            ResizeHandle::E | ResizeHandle::W => Cursor::ResizeEw,
        }
    }
}

/// Pointer cursor requested from the presentation layer
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Move,
    Crosshair,
    ResizeNwse,
    ResizeNesw,
    ResizeNs,
    ResizeEw,
}

/// Element whose cursor is being changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorTarget {
    /// The full-screen overlay container
    Container,
    /// The selection rectangle itself
    Selection,
}

/// What lies under the pointer relative to the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(ResizeHandle),
    Body,
    Outside,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_cursors_pair_opposites() {
        for handle in ResizeHandle::ALL {
            let opposite = match handle {
                ResizeHandle::NW => ResizeHandle::SE,
                ResizeHandle::N => ResizeHandle::S,
                ResizeHandle::NE => ResizeHandle::SW,
                ResizeHandle::E => ResizeHandle::W,
                ResizeHandle::SE => ResizeHandle::NW,
                ResizeHandle::S => ResizeHandle::N,
                ResizeHandle::SW => ResizeHandle::NE,
                ResizeHandle::W => ResizeHandle::E,
            };
            assert_eq!(handle.cursor(), opposite.cursor());
        }
    }
}
