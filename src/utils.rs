// utils.rs - Common Utility Functions
//
// Shared helpers for the Win32 modules.

/// Convert a Rust string to a null-terminated wide string (UTF-16) for Windows API
#[cfg(windows)]
pub fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

/// Convert a Win32 RECT into our rectangle type
#[cfg(windows)]
pub fn rect_from_win32(rect: &windows::Win32::Foundation::RECT) -> crate::geometry::Rect {
    crate::geometry::Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}
