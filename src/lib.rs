//! Screenshot region selection and annotation
//!
//! A capture session shows a pre-captured screenshot, lets the user pick a
//! region (drag, window snap, resize, move), annotate it with rectangles,
//! ellipses, freehand paths, arrows and mosaic strokes, and hands the
//! composited PNG to the host.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod session;
