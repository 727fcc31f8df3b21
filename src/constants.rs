// constants.rs - Application-wide Constants
//
// Centralized colors, dimensions and timings for the highlight overlay.
// These are the defaults; settings.json may override some of them.

/// Overlay colors as (r, g, b)
pub mod colors {
    /// Red highlight fill
    pub const HIGHLIGHT: [u8; 3] = [0xFF, 0x00, 0x00];
    /// White transparency key (must differ from HIGHLIGHT)
    pub const TRANSPARENCY_KEY: [u8; 3] = [0xFF, 0xFF, 0xFF];
}

/// Border frame dimensions
pub mod frame {
    /// Border thickness in pixels
    pub const THICKNESS: i32 = 4;
    /// Largest thickness accepted from settings
    pub const MAX_THICKNESS: i32 = 64;
    /// Layered window alpha (0 = invisible, 255 = opaque)
    pub const ALPHA: u8 = 192;
}

/// Repaint timer
pub mod repaint {
    /// Forced redraw period in milliseconds
    pub const PERIOD_MS: u64 = 300;
    /// Timer id registered on the surface that owns the timer
    pub const TIMER_ID: usize = 100;
}

/// Native names
pub mod names {
    /// Window class shared by the owner and the four border surfaces
    pub const WINDOW_CLASS: &str = "FocusHighlightSurface";
    /// Title of the hidden owner window
    pub const OWNER_TITLE: &str = "FocusHighlight0";
    /// Background thread running the overlay message loop
    pub const OVERLAY_THREAD: &str = "focus-highlight-overlay";
    /// Directory under the platform config dir
    pub const CONFIG_DIR: &str = "FocusHighlight";
    /// Settings file name
    pub const SETTINGS_FILE: &str = "settings.json";
}
