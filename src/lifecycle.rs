// lifecycle.rs - Overlay Thread Lifecycle
//
// The overlay runs on its own thread because the host's event loop may not
// yield. start() creates the surfaces there and waits for the result, so a
// failed startup never leaves a half-built overlay. stop() posts shutdown,
// which unblocks the native loop, and joins the thread before returning.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use log::{error, info};

use crate::bridge::{FocusBridge, FocusEvent, FocusProvider};
use crate::config::HighlightSettings;
use crate::constants::names;
use crate::geometry::{BorderStrips, Rect};
use crate::overlay::{OverlayBackend, OverlaySink};

/// A running focus highlight
pub struct Highlighter {
    bridge: FocusBridge,
    sink: Arc<dyn OverlaySink>,
    thread: Option<JoinHandle<()>>,
}

impl Highlighter {
    /// Spawn the overlay thread, create the surfaces on it and wait until
    /// they exist (or creation failed).
    pub fn start<B: OverlayBackend>(mut backend: B, settings: &HighlightSettings) -> Result<Self> {
        settings.validate().context("invalid highlight settings")?;

        let (ready_tx, ready_rx) = mpsc::channel::<Result<Arc<dyn OverlaySink>>>();

        let thread = thread::Builder::new()
            .name(names::OVERLAY_THREAD.to_string())
            .spawn(move || {
                // No focus yet: every surface starts zero-sized
                match backend.create(&BorderStrips::default()) {
                    Ok(sink) => {
                        if ready_tx.send(Ok(sink)).is_err() {
                            // Nobody is waiting any more; don't keep windows around
                            backend.destroy();
                            return;
                        }
                        backend.run();
                        backend.destroy();
                    }
                    Err(e) => {
                        error!("Overlay startup failed: {:#}", e);
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .context("failed to spawn overlay thread")?;

        match ready_rx.recv() {
            Ok(Ok(sink)) => {
                info!("Focus highlight started");
                Ok(Self {
                    bridge: FocusBridge::new(settings.thickness),
                    sink,
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e.context("failed to create overlay surfaces"))
            }
            Err(_) => {
                let _ = thread.join();
                Err(anyhow!("overlay thread exited during startup"))
            }
        }
    }

    /// Call from the host's focus event handler
    pub fn on_focus_changed(&self, event: &FocusEvent, provider: &dyn FocusProvider) -> bool {
        self.bridge.on_focus_changed(event, provider, self.sink.as_ref())
    }

    /// Rectangle the frame currently surrounds
    pub fn highlighted(&self) -> Rect {
        self.bridge.last_drawn()
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Tear the overlay down and wait for the overlay thread to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.sink.request_shutdown();
        if thread.join().is_err() {
            error!("Overlay thread panicked during shutdown");
        }
        info!("Focus highlight stopped");
    }
}

impl Drop for Highlighter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
