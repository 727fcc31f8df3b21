// overlay/windows.rs - Win32 Overlay Surfaces
//
// One hidden, disabled owner window anchors four layered popups. Each popup
// is a tool window (no taskbar / Alt+Tab entry), click-through via
// WS_EX_TRANSPARENT, topmost, never activated, and painted solid with the
// highlight color. Per-window state lives in GWLP_USERDATA.

use std::cell::{Cell, RefCell};
use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{debug, error, info, warn};

use windows::core::PCWSTR;
use windows::Win32::{
    Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
    Graphics::Gdi::{
        BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, InvalidateRect, HBRUSH,
        PAINTSTRUCT,
    },
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::*,
};

use super::{
    route, OverlayBackend, OverlaySink, SurfaceAction, SurfaceMessage, SurfaceRole, SURFACE_COUNT,
};
use crate::config::HighlightSettings;
use crate::constants::names;
use crate::geometry::BorderStrips;
use crate::scheduler::RepaintScheduler;
use crate::utils::wide_string;

/// State shared by the window procedure of all five windows.
/// Only touched on the overlay thread.
struct SurfaceContext {
    owner: Cell<isize>,
    surfaces: [Cell<isize>; SURFACE_COUNT],
    scheduler: RefCell<RepaintScheduler>,
    highlight_brush: isize,
}

impl SurfaceContext {
    fn new(highlight_brush: HBRUSH, scheduler: RepaintScheduler) -> Self {
        Self {
            owner: Cell::new(0),
            surfaces: Default::default(),
            scheduler: RefCell::new(scheduler),
            highlight_brush: highlight_brush.0 as isize,
        }
    }

    fn role_of(&self, hwnd: HWND) -> Option<SurfaceRole> {
        let raw = hwnd.0 as isize;
        if raw == 0 {
            return None;
        }
        if raw == self.owner.get() {
            return Some(SurfaceRole::Owner);
        }
        self.surfaces
            .iter()
            .position(|slot| slot.get() == raw)
            .map(SurfaceRole::Border)
    }
}

impl Drop for SurfaceContext {
    fn drop(&mut self) {
        if self.highlight_brush != 0 {
            unsafe {
                let _ = DeleteObject(HBRUSH(self.highlight_brush as *mut _).into());
            }
        }
    }
}

/// Win32 implementation of the overlay window set
pub struct Win32Overlay {
    settings: HighlightSettings,
    class_name: Vec<u16>,
    hinstance: isize,
    class_registered: bool,
    key_brush: isize,
    context: Option<Box<SurfaceContext>>,
}

impl Win32Overlay {
    pub fn new(settings: &HighlightSettings) -> Self {
        Self {
            settings: settings.clone(),
            class_name: wide_string(names::WINDOW_CLASS),
            hinstance: 0,
            class_registered: false,
            key_brush: 0,
            context: None,
        }
    }

    unsafe fn create_surfaces(&mut self, strips: &BorderStrips) -> Result<SurfaceHandles> {
        let hinstance: HINSTANCE = GetModuleHandleW(None)
            .context("GetModuleHandleW failed")?
            .into();
        self.hinstance = hinstance.0 as isize;

        // Class background is the transparency key, so unpainted pixels vanish
        let key_brush = CreateSolidBrush(COLORREF(self.settings.transparency_colorref()));
        if key_brush.is_invalid() {
            bail!("failed to create transparency key brush");
        }
        self.key_brush = key_brush.0 as isize;

        let highlight_brush = CreateSolidBrush(COLORREF(self.settings.highlight_colorref()));
        if highlight_brush.is_invalid() {
            bail!("failed to create highlight brush");
        }
        let context = Box::new(SurfaceContext::new(
            highlight_brush,
            RepaintScheduler::new(self.settings.repaint_period()),
        ));
        let context_ptr: *const SurfaceContext = &*context;
        self.context = Some(context);
        let context = &*context_ptr;

        let class_name = PCWSTR(self.class_name.as_ptr());
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(surface_proc),
            hInstance: hinstance,
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            hbrBackground: key_brush,
            lpszClassName: class_name,
            ..Default::default()
        };
        if RegisterClassExW(&wc) == 0 {
            bail!("failed to register overlay window class: {}", io::Error::last_os_error());
        }
        self.class_registered = true;

        // Hidden, disabled anchor: owned popups stay out of task switching
        let owner = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            PCWSTR(wide_string(names::OWNER_TITLE).as_ptr()),
            WS_POPUP | WS_DISABLED,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            None,
            None,
            Some(hinstance),
            None,
        )
        .context("failed to create overlay owner window")?;
        SetWindowLongPtrW(owner, GWLP_USERDATA, context_ptr as isize);
        context.owner.set(owner.0 as isize);

        let mut handles = SurfaceHandles {
            owner: owner.0 as isize,
            surfaces: [0; SURFACE_COUNT],
        };

        let key = COLORREF(self.settings.transparency_colorref());
        for (index, strip) in strips.to_array().iter().enumerate() {
            let title = wide_string(&format!("{}{}", names::WINDOW_CLASS, index + 1));
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class_name,
                PCWSTR(title.as_ptr()),
                WS_POPUP | WS_DISABLED,
                strip.left,
                strip.top,
                strip.width(),
                strip.height(),
                Some(owner),
                None,
                Some(hinstance),
                None,
            )
            .with_context(|| format!("failed to create border surface {}", index))?;

            SetWindowLongPtrW(hwnd, GWLP_USERDATA, context_ptr as isize);
            context.surfaces[index].set(hwnd.0 as isize);
            handles.surfaces[index] = hwnd.0 as isize;

            apply_overlay_style(hwnd);
            SetLayeredWindowAttributes(hwnd, key, self.settings.alpha, LWA_ALPHA | LWA_COLORKEY)
                .with_context(|| format!("failed to set layered attributes on surface {}", index))?;
            SetWindowPos(
                hwnd,
                Some(HWND_TOPMOST),
                strip.left,
                strip.top,
                strip.width(),
                strip.height(),
                SWP_NOACTIVATE,
            )
            .with_context(|| format!("failed to make surface {} topmost", index))?;

            // First show arms the repaint timer through the window procedure
            let _ = ShowWindow(hwnd, SW_SHOWNA);
        }

        info!(
            "Overlay created: owner {:#x}, surfaces {:x?}",
            handles.owner, handles.surfaces
        );
        Ok(handles)
    }
}

impl OverlayBackend for Win32Overlay {
    fn create(&mut self, strips: &BorderStrips) -> Result<Arc<dyn OverlaySink>> {
        match unsafe { self.create_surfaces(strips) } {
            Ok(handles) => Ok(Arc::new(handles)),
            Err(e) => {
                // Leave nothing half-initialized behind
                self.destroy();
                Err(e)
            }
        }
    }

    fn run(&mut self) {
        unsafe {
            let mut msg = MSG::default();
            loop {
                let result = GetMessageW(&mut msg, None, 0, 0);
                if result.0 == 0 {
                    break;
                }
                if result.0 == -1 {
                    error!("GetMessageW failed: {}", io::Error::last_os_error());
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        info!("Overlay message loop finished");
    }

    fn destroy(&mut self) {
        unsafe {
            if let Some(context) = self.context.as_deref() {
                for (index, slot) in context.surfaces.iter().enumerate() {
                    let raw = slot.replace(0);
                    if raw != 0 {
                        if let Err(e) = DestroyWindow(HWND(raw as *mut _)) {
                            error!("Failed to destroy border surface {}: {}", index, e);
                        }
                    }
                }
                let owner = context.owner.replace(0);
                if owner != 0 {
                    if let Err(e) = DestroyWindow(HWND(owner as *mut _)) {
                        error!("Failed to destroy overlay owner window: {}", e);
                    }
                }
            }
            // No windows refer to the context any more
            self.context = None;

            if self.class_registered {
                if let Err(e) = UnregisterClassW(
                    PCWSTR(self.class_name.as_ptr()),
                    Some(HINSTANCE(self.hinstance as *mut _)),
                ) {
                    error!("Failed to unregister overlay window class: {}", e);
                }
                self.class_registered = false;
            }

            if self.key_brush != 0 {
                let _ = DeleteObject(HBRUSH(self.key_brush as *mut _).into());
                self.key_brush = 0;
            }
        }
        info!("Overlay destroyed");
    }
}

/// Handles the host thread uses to drive the surfaces
struct SurfaceHandles {
    owner: isize,
    surfaces: [isize; SURFACE_COUNT],
}

impl OverlaySink for SurfaceHandles {
    fn reposition(&self, strips: &BorderStrips) {
        for (index, (raw, strip)) in self.surfaces.iter().zip(strips.to_array()).enumerate() {
            let hwnd = HWND(*raw as *mut _);
            unsafe {
                // Hide first so the old bounds never paint at the new spot
                let _ = ShowWindow(hwnd, SW_HIDE);
                if let Err(e) = MoveWindow(
                    hwnd,
                    strip.left,
                    strip.top,
                    strip.width(),
                    strip.height(),
                    true,
                ) {
                    warn!("Failed to move border surface {}: {}", index, e);
                }
                let _ = ShowWindow(hwnd, SW_SHOWNA);
            }
        }
        debug!("Surfaces moved to {:?}", strips);
    }

    fn request_shutdown(&self) {
        unsafe {
            // Default handling of WM_CLOSE destroys the owner, which takes the
            // owned surfaces with it and posts WM_QUIT
            if let Err(e) = PostMessageW(
                Some(HWND(self.owner as *mut _)),
                WM_CLOSE,
                WPARAM(0),
                LPARAM(0),
            ) {
                error!("Failed to post shutdown to overlay owner: {}", e);
            }
        }
    }
}

/// Tool window, layered, click-through, never activated; drop WS_EX_APPWINDOW
unsafe fn apply_overlay_style(hwnd: HWND) {
    let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    let new_ex_style = (ex_style & !(WS_EX_APPWINDOW.0 as isize))
        | WS_EX_TOOLWINDOW.0 as isize
        | WS_EX_LAYERED.0 as isize
        | WS_EX_TRANSPARENT.0 as isize
        | WS_EX_NOACTIVATE.0 as isize;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_ex_style);
}

fn translate(msg: u32, wparam: WPARAM) -> SurfaceMessage {
    match msg {
        WM_PAINT => SurfaceMessage::Paint,
        WM_SHOWWINDOW => SurfaceMessage::ShowWindow { visible: wparam.0 != 0 },
        WM_TIMER => SurfaceMessage::Timer { id: wparam.0 },
        WM_DESTROY => SurfaceMessage::Destroy,
        _ => SurfaceMessage::Other,
    }
}

unsafe fn paint_highlight(hwnd: HWND, brush: isize) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);
    let mut rect = RECT::default();
    if GetClientRect(hwnd, &mut rect).is_ok() {
        let _ = FillRect(hdc, &rect, HBRUSH(brush as *mut _));
    }
    let _ = EndPaint(hwnd, &ps);
}

/// Window procedure shared by the owner and the border surfaces
unsafe extern "system" fn surface_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let context_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const SurfaceContext;
    if context_ptr.is_null() {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }
    let context = &*context_ptr;
    let Some(role) = context.role_of(hwnd) else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    let action = match context.scheduler.try_borrow_mut() {
        Ok(mut scheduler) => route(translate(msg, wparam), role, &mut scheduler),
        Err(_) => SurfaceAction::Default,
    };

    match action {
        SurfaceAction::FillHighlight => {
            paint_highlight(hwnd, context.highlight_brush);
            LRESULT(0)
        }
        SurfaceAction::ArmRepaintTimer { period, id } => {
            let elapse = period.as_millis().min(u32::MAX as u128) as u32;
            if SetTimer(Some(hwnd), id, elapse, None) == 0 {
                warn!("Failed to arm repaint timer: {}", io::Error::last_os_error());
            } else {
                debug!("Repaint timer armed every {}ms", elapse);
            }
            LRESULT(0)
        }
        SurfaceAction::InvalidateAll => {
            for slot in &context.surfaces {
                let raw = slot.get();
                if raw != 0 {
                    let _ = InvalidateRect(Some(HWND(raw as *mut _)), None, false);
                }
            }
            LRESULT(0)
        }
        SurfaceAction::Forget => {
            if let SurfaceRole::Border(index) = role {
                context.surfaces[index].set(0);
            }
            LRESULT(0)
        }
        SurfaceAction::PostQuit => {
            context.owner.set(0);
            PostQuitMessage(0);
            LRESULT(0)
        }
        SurfaceAction::Consumed => LRESULT(0),
        SurfaceAction::Default => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
