// host/mod.rs - Focus Sources
//
// Feeds focus changes into a Highlighter when it runs standalone instead of
// inside a screen reader. The Win32 adapter listens for system focus events
// and answers focus/desktop queries from the window manager.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use self::windows::{run_focus_loop, SystemFocusProvider};
