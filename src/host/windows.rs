// host/windows.rs - Win32 Focus Events
//
// Out-of-context WinEvent hook for EVENT_OBJECT_FOCUS, delivered through the
// message pump of the thread that installed it. Each event is resolved to the
// focused accessible object's location, or its window's bounds if that fails. Ctrl+C posts WM_QUIT to that
// thread, which ends the pump.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{bail, Result};
use log::{debug, info, warn};

use windows::core::{BOOL, VARIANT};
use windows::Win32::{
    Foundation::{HWND, LPARAM, RECT, WPARAM},
    System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED},
    System::Console::SetConsoleCtrlHandler,
    System::Threading::GetCurrentThreadId,
    UI::Accessibility::{
        AccessibleObjectFromEvent, IAccessible, SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK,
    },
    UI::WindowsAndMessaging::{
        DispatchMessageW, GetDesktopWindow, GetGUIThreadInfo, GetMessageW, GetSystemMetrics,
        GetWindowRect, PostThreadMessageW, TranslateMessage, GUITHREADINFO, MSG, SM_CXSCREEN,
        SM_CYSCREEN, WM_QUIT,
    },
};

use crate::bridge::{FocusEvent, FocusProvider};
use crate::geometry::{FocusRegion, Rect};
use crate::utils::rect_from_win32;

const EVENT_OBJECT_FOCUS: u32 = 0x8005;
const WINEVENT_OUTOFCONTEXT: u32 = 0x0000;
const WINEVENT_SKIPOWNPROCESS: u32 = 0x0002;

/// Thread running the focus pump, target of the Ctrl+C quit
static PUMP_THREAD: AtomicU32 = AtomicU32::new(0);

thread_local! {
    static FOCUS_HANDLER: RefCell<Option<Box<dyn FnMut(FocusEvent)>>> = RefCell::new(None);
}

/// Answers focus queries from the window manager
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFocusProvider;

impl FocusProvider for SystemFocusProvider {
    fn focused_region(&self) -> Option<Rect> {
        unsafe {
            let mut info = GUITHREADINFO {
                cbSize: std::mem::size_of::<GUITHREADINFO>() as u32,
                ..Default::default()
            };
            // Thread 0 = the foreground thread
            GetGUIThreadInfo(0, &mut info).ok()?;
            if info.hwndFocus.is_invalid() {
                return None;
            }
            window_rect(info.hwndFocus)
        }
    }

    fn desktop_bounds(&self) -> Rect {
        unsafe {
            window_rect(GetDesktopWindow()).unwrap_or_else(|| {
                // Fallback to screen dimensions
                Rect::new(0, 0, GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN))
            })
        }
    }
}

unsafe fn window_rect(hwnd: HWND) -> Option<Rect> {
    let mut rect = RECT::default();
    GetWindowRect(hwnd, &mut rect).ok()?;
    Some(rect_from_win32(&rect))
}

/// Location of the object the event names, e.g. one list item inside its control
unsafe fn accessible_location(hwnd: HWND, id_object: i32, id_child: i32) -> Option<FocusRegion> {
    let mut accessible: Option<IAccessible> = None;
    let mut child = VARIANT::default();
    AccessibleObjectFromEvent(hwnd, id_object as u32, id_child as u32, &mut accessible, &mut child)
        .ok()?;
    let accessible = accessible?;

    let (mut x, mut y, mut width, mut height) = (0, 0, 0, 0);
    accessible
        .accLocation(&mut x, &mut y, &mut width, &mut height, &child)
        .ok()?;
    Some(FocusRegion::new(x, y, width, height))
}

unsafe fn window_region(hwnd: HWND) -> Option<FocusRegion> {
    let rect = window_rect(hwnd)?;
    Some(FocusRegion::new(rect.left, rect.top, rect.width(), rect.height()))
}

/// Install the focus hook on this thread and pump messages until Ctrl+C.
///
/// `on_focus` runs on this thread for every system focus change.
pub fn run_focus_loop(on_focus: impl FnMut(FocusEvent) + 'static) -> Result<()> {
    FOCUS_HANDLER.with(|handler| *handler.borrow_mut() = Some(Box::new(on_focus)));

    unsafe {
        // Accessible objects are resolved on this thread
        let com_ready = CoInitializeEx(None, COINIT_APARTMENTTHREADED).is_ok();
        if !com_ready {
            warn!("COM not initialized, focus falls back to window bounds");
        }

        PUMP_THREAD.store(GetCurrentThreadId(), Ordering::SeqCst);
        if let Err(e) = SetConsoleCtrlHandler(Some(ctrl_handler), true) {
            warn!("Ctrl+C handler not installed: {}", e);
        }

        let hook = SetWinEventHook(
            EVENT_OBJECT_FOCUS,
            EVENT_OBJECT_FOCUS,
            None,
            Some(focus_event_proc),
            0,
            0,
            WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
        );
        if hook.is_invalid() {
            FOCUS_HANDLER.with(|handler| handler.borrow_mut().take());
            if com_ready {
                CoUninitialize();
            }
            bail!("failed to install focus event hook");
        }
        info!("Listening for focus changes, press Ctrl+C to quit");

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        let _ = UnhookWinEvent(hook);
        PUMP_THREAD.store(0, Ordering::SeqCst);
        if com_ready {
            CoUninitialize();
        }
    }

    FOCUS_HANDLER.with(|handler| handler.borrow_mut().take());
    info!("Focus hook removed");
    Ok(())
}

unsafe extern "system" fn focus_event_proc(
    _hook: HWINEVENTHOOK,
    _event: u32,
    hwnd: HWND,
    id_object: i32,
    id_child: i32,
    _event_thread: u32,
    _event_time: u32,
) {
    let location = if hwnd.is_invalid() {
        None
    } else {
        accessible_location(hwnd, id_object, id_child).or_else(|| {
            debug!("No accessible location for the focus event, using the window bounds");
            window_region(hwnd)
        })
    };
    let event = match location {
        Some(region) => FocusEvent::at(region),
        None => FocusEvent::without_location(),
    };

    FOCUS_HANDLER.with(|handler| match handler.try_borrow_mut() {
        Ok(mut handler) => {
            if let Some(on_focus) = handler.as_mut() {
                on_focus(event);
            }
        }
        Err(_) => debug!("Focus event arrived while the previous one was still running"),
    });
}

unsafe extern "system" fn ctrl_handler(_ctrl_type: u32) -> BOOL {
    let thread = PUMP_THREAD.load(Ordering::SeqCst);
    if thread != 0 {
        let _ = PostThreadMessageW(thread, WM_QUIT, WPARAM(0), LPARAM(0));
    }
    BOOL(1)
}
