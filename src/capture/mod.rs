//! Captured screenshot handling
//!
//! This module contains:
//! - The raw RGBA screenshot handed over by the host (image.rs)

pub mod image;
