//! Pure WinAPI projection window
//!
//! Runs in its own thread with a dedicated message loop, so the window keeps
//! painting regardless of what the host UI thread is doing. All updates from
//! other threads go through asynchronous window-position requests, posted
//! messages, or the shared transform slot: the window thread is the only
//! writer of the window itself.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, InvalidateRect, PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
    GetMessageW, GetWindowLongPtrW, PostMessageW, PostQuitMessage, RegisterClassExW,
    SetWindowLongPtrW, SetWindowPos, ShowWindowAsync, GWL_EXSTYLE, GWL_STYLE, HWND_NOTOPMOST,
    HWND_TOPMOST, MA_NOACTIVATE, MSG, SWP_ASYNCWINDOWPOS, SWP_FRAMECHANGED, SWP_NOACTIVATE,
    SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE, SW_SHOWNOACTIVATE, WINDOW_EX_STYLE,
    WINDOW_STYLE, WM_CLOSE, WM_DESTROY, WM_ERASEBKGND, WM_MOUSEACTIVATE, WM_PAINT, WNDCLASSEXW,
    WS_EX_APPWINDOW, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_OVERLAPPEDWINDOW,
    WS_POPUP, WS_VISIBLE,
};

use crate::config;
use crate::monitors::Rect;
use crate::traits::{OutputSurface, SurfaceError, SurfaceFactory};
use crate::transform::ViewTransform;

const CLASS_NAME: PCWSTR = w!("ProjectorOutputWindow");

static CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

fn styles_for(borderless_topmost: bool) -> (WINDOW_STYLE, WINDOW_EX_STYLE) {
    if borderless_topmost {
        (
            WS_POPUP,
            WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE | WS_EX_TOPMOST,
        )
    } else {
        (WS_OVERLAPPEDWINDOW, WS_EX_APPWINDOW | WS_EX_NOACTIVATE)
    }
}

/// Native projection window
pub struct WindowsProjectionWindow {
    hwnd: isize,
    /// Latest transform pushed from the preview; read by the renderer
    transform: Arc<Mutex<ViewTransform>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl WindowsProjectionWindow {
    /// Create the window on a dedicated thread and wait for its handle
    pub fn new(rect: Rect, borderless_topmost: bool) -> Result<Self, SurfaceError> {
        tracing::info!(rect = %rect, borderless_topmost, "Creating projection window");

        let (tx, rx) = mpsc::channel::<Result<isize, String>>();
        let abandoned = Arc::new(AtomicBool::new(false));
        let thread_abandoned = Arc::clone(&abandoned);
        let thread_handle = thread::spawn(move || {
            run_window_thread(rect, borderless_topmost, tx, &thread_abandoned);
        });

        let timeout = Duration::from_millis(
            config::window::CREATION_TIMEOUT_ITERATIONS as u64
                * config::window::CREATION_POLL_INTERVAL_MS,
        );

        match rx.recv_timeout(timeout) {
            Ok(Ok(hwnd)) => Ok(Self {
                hwnd,
                transform: Arc::new(Mutex::new(ViewTransform::IDENTITY)),
                thread_handle: Some(thread_handle),
            }),
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                Err(SurfaceError::CreationFailed(e))
            }
            Err(_) => {
                // Set before draining: a handle sent after this point is
                // destroyed by the window thread itself
                abandoned.store(true, Ordering::SeqCst);
                if let Ok(Ok(hwnd)) = rx.try_recv() {
                    unsafe {
                        let _ = PostMessageW(
                            Some(HWND(hwnd as *mut std::ffi::c_void)),
                            WM_CLOSE,
                            WPARAM(0),
                            LPARAM(0),
                        );
                    }
                }
                drop(rx);
                Err(SurfaceError::CreationFailed(
                    "timed out waiting for projection window".to_string(),
                ))
            }
        }
    }

    pub fn hwnd_value(&self) -> isize {
        self.hwnd
    }

    /// Latest transform the renderer should apply
    pub fn current_transform(&self) -> ViewTransform {
        self.transform
            .lock()
            .map(|t| *t)
            .unwrap_or(ViewTransform::IDENTITY)
    }

    fn hwnd(&self) -> Result<HWND, SurfaceError> {
        if self.hwnd == 0 {
            return Err(SurfaceError::InvalidHandle);
        }
        Ok(HWND(self.hwnd as *mut std::ffi::c_void))
    }
}

impl OutputSurface for WindowsProjectionWindow {
    fn set_geometry(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        let hwnd = self.hwnd()?;
        unsafe {
            SetWindowPos(
                hwnd,
                None,
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
                SWP_NOZORDER | SWP_NOACTIVATE | SWP_ASYNCWINDOWPOS,
            )
        }
        .map_err(|e| SurfaceError::Os(e.to_string()))?;
        tracing::debug!(rect = %rect, "Projection window geometry requested");
        Ok(())
    }

    fn set_borderless_topmost(&mut self, enabled: bool) -> Result<(), SurfaceError> {
        let hwnd = self.hwnd()?;
        let (style, ex_style) = styles_for(enabled);

        unsafe {
            let visible = GetWindowLongPtrW(hwnd, GWL_STYLE) as u32 & WS_VISIBLE.0;
            SetWindowLongPtrW(hwnd, GWL_STYLE, (style.0 | visible) as isize);
            SetWindowLongPtrW(hwnd, GWL_EXSTYLE, ex_style.0 as isize);

            let insert_after = if enabled { HWND_TOPMOST } else { HWND_NOTOPMOST };
            SetWindowPos(
                hwnd,
                Some(insert_after),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_FRAMECHANGED | SWP_ASYNCWINDOWPOS,
            )
        }
        .map_err(|e| SurfaceError::Os(e.to_string()))?;

        tracing::debug!(enabled, "Projection window style updated");
        Ok(())
    }

    fn set_transform(&mut self, transform: &ViewTransform) -> Result<(), SurfaceError> {
        let hwnd = self.hwnd()?;
        if let Ok(mut slot) = self.transform.lock() {
            *slot = *transform;
        }
        unsafe {
            let _ = InvalidateRect(Some(hwnd), None, false);
        }
        Ok(())
    }

    fn show(&mut self) -> Result<(), SurfaceError> {
        let hwnd = self.hwnd()?;
        unsafe {
            let _ = ShowWindowAsync(hwnd, SW_SHOWNOACTIVATE);
        }
        Ok(())
    }

    fn hide(&mut self) -> Result<(), SurfaceError> {
        let hwnd = self.hwnd()?;
        unsafe {
            let _ = ShowWindowAsync(hwnd, SW_HIDE);
        }
        Ok(())
    }
}

impl Drop for WindowsProjectionWindow {
    fn drop(&mut self) {
        tracing::info!("Destroying projection window");

        if let Ok(hwnd) = self.hwnd() {
            unsafe {
                let _ = PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0));
            }
        }

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.hwnd = 0;
    }
}

/// Factory producing native projection windows
#[derive(Debug, Default)]
pub struct WindowsProjectionFactory;

impl SurfaceFactory for WindowsProjectionFactory {
    type Surface = WindowsProjectionWindow;

    fn create(&mut self, rect: Rect, borderless_topmost: bool) -> Result<WindowsProjectionWindow, SurfaceError> {
        WindowsProjectionWindow::new(rect, borderless_topmost)
    }
}

/// Window thread - creates the window and runs its message loop
fn run_window_thread(
    rect: Rect,
    borderless_topmost: bool,
    tx: mpsc::Sender<Result<isize, String>>,
    abandoned: &AtomicBool,
) {
    tracing::debug!("Projection window thread started");

    unsafe {
        let hinstance = match GetModuleHandleW(None) {
            Ok(h) => h,
            Err(e) => {
                let _ = tx.send(Err(format!("GetModuleHandleW failed: {}", e)));
                return;
            }
        };

        if !CLASS_REGISTERED.swap(true, Ordering::SeqCst) {
            let wc = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };

            if RegisterClassExW(&wc) == 0 {
                CLASS_REGISTERED.store(false, Ordering::SeqCst);
                let _ = tx.send(Err("Failed to register projection window class".to_string()));
                return;
            }
        }

        let (style, ex_style) = styles_for(borderless_topmost);

        // Created hidden; the controller shows it once style and transform are applied
        let hwnd = match CreateWindowExW(
            ex_style,
            CLASS_NAME,
            w!("Projector"),
            style,
            rect.x,
            rect.y,
            rect.width as i32,
            rect.height as i32,
            None,
            None,
            Some(hinstance.into()),
            None,
        ) {
            Ok(h) => h,
            Err(e) => {
                let _ = tx.send(Err(format!("CreateWindowExW failed: {}", e)));
                return;
            }
        };

        if tx.send(Ok(hwnd.0 as isize)).is_err() || abandoned.load(Ordering::SeqCst) {
            tracing::warn!("Projection window creation was abandoned, destroying window");
            let _ = DestroyWindow(hwnd);
            return;
        }

        tracing::info!(hwnd = ?hwnd, "Projection window created");

        let mut msg = MSG::default();
        loop {
            let result = GetMessageW(&mut msg, None, 0, 0);
            if result.0 <= 0 {
                break; // WM_QUIT or error
            }
            let _ = DispatchMessageW(&msg);
        }
    }

    tracing::debug!("Projection window thread exiting");
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_MOUSEACTIVATE => LRESULT(MA_NOACTIVATE as isize),
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            unsafe {
                let hdc = BeginPaint(hwnd, &mut ps);
                let mut rect = RECT::default();
                let _ = GetClientRect(hwnd, &mut rect);

                let brush = CreateSolidBrush(COLORREF(config::window::BACKGROUND_COLOR));
                FillRect(hdc, &rect, brush);
                let _ = DeleteObject(brush.into());

                let _ = EndPaint(hwnd, &ps);
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe {
                PostQuitMessage(0);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_window_handle_moves_across_threads() {
        assert_send::<WindowsProjectionWindow>();
    }

    #[test]
    fn test_styles_follow_placement_kind() {
        let (style, ex_style) = styles_for(true);
        assert_eq!(style, WS_POPUP);
        assert!(ex_style.contains(WS_EX_TOPMOST | WS_EX_NOACTIVATE));

        let (style, ex_style) = styles_for(false);
        assert_eq!(style, WS_OVERLAPPEDWINDOW);
        assert!(!ex_style.contains(WS_EX_TOPMOST));
    }
}
