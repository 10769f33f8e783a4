//! Annotation drawing on the frozen selection
//!
//! This module provides:
//! - The layered annotation canvas (base, mosaic and vector overlay surfaces)
//! - Pointer-driven shape construction, undo and export

pub mod canvas;

pub use canvas::{AnnotationCanvas, CanvasSettings};
