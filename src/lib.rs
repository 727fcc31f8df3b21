//! Focus Highlight - Focus Rectangle Overlay
//!
//! Draws a semi-opaque, click-through frame around the on-screen location of
//! the input focus for screen reader users with partial vision.

pub mod bridge;
pub mod config;
pub mod constants;
pub mod geometry;
pub mod host;
pub mod lifecycle;
pub mod overlay;
pub mod scheduler;
mod utils;

// Re-export commonly used types
pub use bridge::{FocusBridge, FocusEvent, FocusProvider};
pub use config::HighlightSettings;
pub use geometry::{BorderStrips, Edge, FocusRegion, Rect};
pub use lifecycle::Highlighter;
pub use overlay::{OverlayBackend, OverlaySink};

#[cfg(windows)]
pub use overlay::Win32Overlay;
