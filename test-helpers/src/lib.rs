//! Common record builders for tests and benchmarks.
use pointer_trace::config::Toggles;
use pointer_trace::dispatch::names::{
    WM_LBUTTONDOWN, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_POINTERDEVICECHANGE, WM_POINTERDOWN, WM_POINTERUP,
    WM_POINTERUPDATE, WM_POINTERWHEEL,
};
use pointer_trace::event::{make_lparam, EventRecord};

// --- Flag values ---
pub const FLAG_NEW: usize = 0x0001;
pub const FLAG_INRANGE: usize = 0x0002;
pub const FLAG_INCONTACT: usize = 0x0004;
pub const FLAG_FIRSTBUTTON: usize = 0x0010;
pub const FLAG_PRIMARY: usize = 0x2000;

pub const MK_LBUTTON: usize = 0x0001;
pub const MK_SHIFT: usize = 0x0004;
pub const MK_CONTROL: usize = 0x0008;

/// Packs a pointer id and POINTER_MESSAGE_FLAG_* bits the way
/// WM_POINTER* wParam carries them.
pub fn pointer_wparam(pointer_id: u16, flags: usize) -> usize {
    (flags << 16) | pointer_id as usize
}

// --- Record builders ---

pub fn pointer_down(pointer_id: u16, x: i32, y: i32) -> EventRecord {
    EventRecord::new(
        WM_POINTERDOWN,
        pointer_wparam(pointer_id, FLAG_NEW | FLAG_INRANGE | FLAG_INCONTACT | FLAG_PRIMARY | FLAG_FIRSTBUTTON),
        make_lparam(x, y),
    )
}

pub fn pointer_update(pointer_id: u16, x: i32, y: i32) -> EventRecord {
    EventRecord::new(
        WM_POINTERUPDATE,
        pointer_wparam(pointer_id, FLAG_INRANGE | FLAG_INCONTACT | FLAG_PRIMARY | FLAG_FIRSTBUTTON),
        make_lparam(x, y),
    )
}

pub fn pointer_up(pointer_id: u16, x: i32, y: i32) -> EventRecord {
    EventRecord::new(
        WM_POINTERUP,
        pointer_wparam(pointer_id, FLAG_INRANGE | FLAG_PRIMARY),
        make_lparam(x, y),
    )
}

/// WM_POINTERWHEEL: the high word of wParam carries the signed wheel delta.
pub fn pointer_wheel(pointer_id: u16, delta: i16, x: i32, y: i32) -> EventRecord {
    EventRecord::new(
        WM_POINTERWHEEL,
        ((delta as u16 as usize) << 16) | pointer_id as usize,
        make_lparam(x, y),
    )
}

pub fn device_change(code: usize) -> EventRecord {
    EventRecord::new(WM_POINTERDEVICECHANGE, code, 0)
}

pub fn mouse_move(key_state: usize, x: i32, y: i32) -> EventRecord {
    EventRecord::new(WM_MOUSEMOVE, key_state, make_lparam(x, y))
}

pub fn mouse_wheel(key_state: usize, delta: i16, x: i32, y: i32) -> EventRecord {
    EventRecord::new(
        WM_MOUSEWHEEL,
        ((delta as u16 as usize) << 16) | key_state,
        make_lparam(x, y),
    )
}

pub fn left_button_down(key_state: usize, x: i32, y: i32) -> EventRecord {
    EventRecord::new(WM_LBUTTONDOWN, key_state | MK_LBUTTON, make_lparam(x, y))
}

// --- Toggle presets ---

/// Full field listing, no throttling, motion traced.
pub fn verbose_toggles() -> Toggles {
    Toggles {
        terse: false,
        throttle: false,
        motion_events: true,
        ..Toggles::default()
    }
}

pub fn throttled_toggles() -> Toggles {
    Toggles {
        throttle: true,
        ..Toggles::default()
    }
}

/// One headless record line for `record` at `time_ms`.
pub fn record_line(time_ms: u64, record: &EventRecord) -> String {
    format!("{time_ms} {:#x} {:#x} {}", record.kind, record.wparam, record.lparam)
}
