//! Capture session interaction module
//!
//! This module contains:
//! - Event, effect and toolbar message types
//! - The pure selection state machine and its controller
//! - Toolbar and size label placement
//! - Keyboard shortcut mapping

pub mod layout;
pub mod messages;
pub mod shortcuts;
pub mod state;
