//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared by selection, shapes and the mosaic brush
//! - The block-averaging mosaic painter
//! - Shape rendering using tiny-skia and PNG encoding

pub mod geometry;
pub mod image;
pub mod mosaic;
