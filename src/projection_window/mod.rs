//! Projection window implementations
//!
//! - Windows: native borderless topmost Win32 window on its own thread
//! - Everywhere: headless in-memory surface (non-Windows hosts and tests)

mod headless;
pub use headless::{HeadlessFactory, HeadlessSurface};

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use self::windows::{WindowsProjectionFactory, WindowsProjectionWindow};
