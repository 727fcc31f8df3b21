// overlay/mod.rs - Platform-agnostic Overlay Window Set
//
// Four borderless, click-through, topmost surfaces draw the highlight frame,
// anchored to one hidden owner window. The Win32 backend does the native
// work; the message routing below is plain logic so it can be tested on any
// platform.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::geometry::BorderStrips;
use crate::scheduler::RepaintScheduler;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use self::windows::Win32Overlay;

/// Number of border surfaces (top, bottom, left, right)
pub const SURFACE_COUNT: usize = 4;

/// Host-side handle to live overlay surfaces.
///
/// Called from the host's thread while the surfaces belong to the overlay
/// thread, so implementations only touch thread-safe native operations.
pub trait OverlaySink: Send + Sync {
    /// Hide, move and re-show every surface without activating it
    fn reposition(&self, strips: &BorderStrips);

    /// Ask the overlay thread to tear down; unblocks its message loop
    fn request_shutdown(&self);
}

/// Creates, runs and destroys one overlay instance on the overlay thread
pub trait OverlayBackend: Send + 'static {
    /// Create the owner and the four border surfaces at `strips`.
    /// Any failure leaves nothing behind.
    fn create(&mut self, strips: &BorderStrips) -> Result<Arc<dyn OverlaySink>>;

    /// Block in the native event loop until shutdown is requested
    fn run(&mut self);

    /// Release every surface and registered resource. Errors are logged.
    fn destroy(&mut self);
}

/// Which window a message was delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRole {
    /// Hidden anchor window
    Owner,
    /// Border surface by index into `Edge::ALL`
    Border(usize),
}

/// The native messages the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMessage {
    Paint,
    ShowWindow { visible: bool },
    Timer { id: usize },
    Destroy,
    Other,
}

/// What the backend should do in response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Fill the client area with the highlight color
    FillHighlight,
    /// Start the recurring repaint timer `id` on this surface
    ArmRepaintTimer { period: Duration, id: usize },
    /// Invalidate all border surfaces without erasing
    InvalidateAll,
    /// Forget this surface's handle; it is going away
    Forget,
    /// Forget the owner and end the message loop
    PostQuit,
    /// Handled, nothing else to do
    Consumed,
    /// Hand to the default window procedure
    Default,
}

/// Routing table for overlay window messages
pub fn route(
    message: SurfaceMessage,
    role: SurfaceRole,
    scheduler: &mut RepaintScheduler,
) -> SurfaceAction {
    match (message, role) {
        (SurfaceMessage::Paint, SurfaceRole::Border(_)) => SurfaceAction::FillHighlight,
        (SurfaceMessage::ShowWindow { visible: true }, SurfaceRole::Border(index)) => {
            match scheduler.on_surface_shown(index) {
                Some((period, id)) => SurfaceAction::ArmRepaintTimer { period, id },
                None => SurfaceAction::Consumed,
            }
        }
        (SurfaceMessage::ShowWindow { .. }, SurfaceRole::Border(_)) => SurfaceAction::Consumed,
        (SurfaceMessage::Timer { id }, _) if scheduler.is_repaint_tick(id) => {
            SurfaceAction::InvalidateAll
        }
        (SurfaceMessage::Destroy, SurfaceRole::Border(index)) => {
            scheduler.on_surface_destroyed(index);
            SurfaceAction::Forget
        }
        (SurfaceMessage::Destroy, SurfaceRole::Owner) => SurfaceAction::PostQuit,
        _ => SurfaceAction::Default,
    }
}
