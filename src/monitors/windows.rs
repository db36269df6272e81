//! Win32 monitor enumeration
//!
//! EnumDisplayMonitors + GetMonitorInfoW give bounds and the primary flag.
//! The stable device identifier comes from EnumDisplayDevicesW with
//! EDD_GET_DEVICE_INTERFACE_NAME, which survives reboots and display
//! re-ordering (unlike `\\.\DISPLAYn`, which is kept only as a fallback).

use std::mem;

use windows::core::{BOOL, PCWSTR};
use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayDevicesW, EnumDisplayMonitors, GetMonitorInfoW, DISPLAY_DEVICEW, HDC, HMONITOR,
    MONITORINFOEXW,
};
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};

use super::{MonitorDescriptor, MonitorError, Rect};

const MONITORINFOF_PRIMARY: u32 = 0x0000_0001;
const EDD_GET_DEVICE_INTERFACE_NAME: u32 = 0x0000_0001;

fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// Look up the monitor attached to a GDI display device (`\\.\DISPLAYn`).
/// Returns (interface name, device string) when available.
unsafe fn query_display_device(gdi_name: &[u16]) -> Option<(String, String)> {
    let mut device: DISPLAY_DEVICEW = mem::zeroed();
    device.cb = mem::size_of::<DISPLAY_DEVICEW>() as u32;

    let found = EnumDisplayDevicesW(
        PCWSTR::from_raw(gdi_name.as_ptr()),
        0,
        &mut device,
        EDD_GET_DEVICE_INTERFACE_NAME,
    )
    .as_bool();
    if !found {
        return None;
    }

    let device_id = wide_to_string(&device.DeviceID);
    if device_id.is_empty() {
        return None;
    }
    Some((device_id, wide_to_string(&device.DeviceString)))
}

unsafe extern "system" fn enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = &mut *(lparam.0 as *mut Vec<MonitorDescriptor>);

    let mut info: MONITORINFOEXW = mem::zeroed();
    info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;

    if !GetMonitorInfoW(hmonitor, &mut info.monitorInfo as *mut _ as *mut _).as_bool() {
        tracing::debug!(hmonitor = ?hmonitor, "GetMonitorInfoW failed, skipping monitor");
        return BOOL::from(true);
    }

    let rect = info.monitorInfo.rcMonitor;
    let gdi_name = wide_to_string(&info.szDevice);

    let mut dpi_x = 96;
    let mut dpi_y = 96;
    let _ = GetDpiForMonitor(hmonitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y);

    let (device_id, name) = match query_display_device(&info.szDevice) {
        Some((id, device_string)) if !device_string.is_empty() => (id, device_string),
        Some((id, _)) => (id, gdi_name.clone()),
        None => (gdi_name.clone(), gdi_name.clone()),
    };

    monitors.push(MonitorDescriptor {
        device_id,
        name,
        is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
        bounds: Rect {
            x: rect.left,
            y: rect.top,
            width: (rect.right - rect.left).max(0) as u32,
            height: (rect.bottom - rect.top).max(0) as u32,
        },
        scale_factor: dpi_x as f64 / 96.0,
    });

    BOOL::from(true)
}

pub(super) fn enumerate() -> Result<Vec<MonitorDescriptor>, MonitorError> {
    let mut monitors: Vec<MonitorDescriptor> = Vec::new();

    let ok = unsafe {
        let monitors_ptr = &mut monitors as *mut Vec<MonitorDescriptor> as isize;
        EnumDisplayMonitors(
            Some(HDC::default()),
            None,
            Some(enum_proc),
            LPARAM(monitors_ptr),
        )
        .as_bool()
    };

    if !ok {
        return Err(MonitorError::EnumerationFailed(
            std::io::Error::last_os_error().to_string(),
        ));
    }

    for monitor in &monitors {
        tracing::trace!(
            device_id = %monitor.device_id,
            primary = monitor.is_primary,
            bounds = %monitor.bounds,
            scale = monitor.scale_factor,
            "Monitor"
        );
    }

    Ok(monitors)
}
