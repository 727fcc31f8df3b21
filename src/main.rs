// main.rs - Focus Highlight Entry Point
//
// Standalone runner: starts the overlay thread and follows system focus
// changes until Ctrl+C.

use anyhow::Result;
use log::info;

use focus_highlight::HighlightSettings;

#[cfg(windows)]
fn run(settings: HighlightSettings) -> Result<()> {
    use std::rc::Rc;

    use focus_highlight::host::{run_focus_loop, SystemFocusProvider};
    use focus_highlight::{Highlighter, Win32Overlay};
    use log::warn;

    let highlighter = Rc::new(Highlighter::start(Win32Overlay::new(&settings), &settings)?);

    let handler = Rc::clone(&highlighter);
    let provider = SystemFocusProvider;
    run_focus_loop(move |event| {
        handler.on_focus_changed(&event, &provider);
    })?;

    match Rc::try_unwrap(highlighter) {
        Ok(highlighter) => highlighter.stop(),
        // Last reference drops and stops it anyway
        Err(_) => warn!("Focus handler still holds the highlighter"),
    }
    Ok(())
}

#[cfg(not(windows))]
fn run(_settings: HighlightSettings) -> Result<()> {
    anyhow::bail!("the focus highlight overlay uses Win32 windows and only runs on Windows")
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Focus Highlight starting...");

    let settings = HighlightSettings::load();
    run(settings)?;

    info!("Focus Highlight shutting down");
    Ok(())
}
