//! # User Interface Module
//!
//! Dear ImGui overlay for onscreen windows: the keyboard/mouse help panel,
//! the frame-rate meter and transient status notices. Offscreen viewers
//! carry no overlay.

pub mod overlay;

// Re-export main types
pub use overlay::Overlay;
