//! Core application module
//!
//! This module contains:
//! - The capture session tying selection, annotation and export together
//! - The host bridge interface and the local file/clipboard host

pub mod app;
pub mod bridge;

pub use app::CaptureSession;
pub use bridge::{HostBridge, LocalBridge};
