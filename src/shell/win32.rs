// Window shell: one top-level window with a row of toggle checkboxes, an
// "Inject" button, a disabled multi-line edit control mirroring the LogBuffer
// and a bare input area below it. Every message reaching the window procedure
// goes through the dispatch pipeline first.

use super::layout::{self, Layout, Rect};
use super::report_stats;
use crate::config::{Config, Toggle, Toggles};
use crate::dispatch::names::WM_TOUCHHITTESTING;
use crate::dispatch::{Disposition, Dispatcher};
use crate::event::{hiword, EventRecord, HitTestInput};
use crate::inject::{InjectError, InjectionScript, Injector, InjectorNotice, Phase, PointerDevice, Sample};
use crate::logger::{LogBuffer, LogSink};
use anyhow::Context;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::cell::RefCell;
use std::ffi::c_void;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    ClientToScreen, CreateFontIndirectW, DeleteObject, GetSysColorBrush, ANTIALIASED_QUALITY, COLOR_BTNFACE,
    DEFAULT_CHARSET, HFONT, LOGFONTW,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::{
    CreateSyntheticPointerDevice, DestroySyntheticPointerDevice, InjectSyntheticPointerInput,
    RegisterPointerDeviceNotifications, RegisterTouchHitTestingWindow, HSYNTHETICPOINTERDEVICE,
    POINTER_FEEDBACK_DEFAULT, POINTER_TYPE_INFO, POINTER_TYPE_INFO_0, TOUCH_HIT_TESTING_INPUT,
};
use windows::Win32::UI::HiDpi::GetDpiForWindow;
use windows::Win32::UI::Input::Pointer::{
    EnableMouseInPointer, POINTER_FLAGS, POINTER_FLAG_DOWN, POINTER_FLAG_INCONTACT, POINTER_FLAG_INRANGE,
    POINTER_FLAG_PRIMARY, POINTER_FLAG_UP, POINTER_FLAG_UPDATE, POINTER_PEN_INFO,
};
use windows::Win32::UI::Input::Touch::{RegisterTouchWindow, REGISTER_TOUCH_WINDOW_FLAGS};
use windows::Win32::UI::WindowsAndMessaging::*;

const PT_PEN: POINTER_INPUT_TYPE = POINTER_INPUT_TYPE(0x00000003);

const PEN_MASK_PRESSURE: u32 = 0x0000_0001;
const PEN_MASK_TILT_X: u32 = 0x0000_0004;
const PEN_MASK_TILT_Y: u32 = 0x0000_0008;

// Control messages and styles, by value.
const EM_SETSEL: u32 = 0x00B1;
const EM_SCROLLCARET: u32 = 0x00B7;
const EM_REPLACESEL: u32 = 0x00C2;
const EM_SETLIMITTEXT: u32 = 0x00C5;
const BM_SETCHECK: u32 = 0x00F1;
const BST_CHECKED: usize = 1;
const BN_CLICKED: u16 = 0;
const BS_PUSHBUTTON: u32 = 0x0000;
const BS_AUTOCHECKBOX: u32 = 0x0003;
const ES_MULTILINE: u32 = 0x0004;
const ES_AUTOVSCROLL: u32 = 0x0040;
const ES_READONLY: u32 = 0x0800;
const TOUCH_HIT_TESTING_CLIENT: u32 = 0x1;
const FW_NORMAL: i32 = 400;

const ID_TOGGLE_BASE: u16 = 100;
const ID_INJECT: u16 = 200;
const ID_LOG: u16 = 300;
const NOTICE_TIMER: usize = 1;
const NOTICE_POLL_MS: u32 = 100;

/// Synthetic pen backed by the host injection API. The device is destroyed
/// when the value is dropped.
pub struct SyntheticPen {
    device: HSYNTHETICPOINTERDEVICE,
}

impl SyntheticPen {
    pub fn new() -> Result<Self, InjectError> {
        let device = unsafe { CreateSyntheticPointerDevice(PT_PEN, 1, POINTER_FEEDBACK_DEFAULT) }
            .map_err(|e| InjectError::Device(format!("CreateSyntheticPointerDevice: {e}")))?;
        debug!("Synthetic pen device created");
        Ok(SyntheticPen { device })
    }
}

impl PointerDevice for SyntheticPen {
    fn inject(&mut self, sample: &Sample) -> Result<(), InjectError> {
        let contact = POINTER_FLAG_INRANGE | POINTER_FLAG_INCONTACT | POINTER_FLAG_PRIMARY;
        let flags: POINTER_FLAGS = match sample.phase {
            Phase::Down => contact | POINTER_FLAG_DOWN,
            Phase::Move => contact | POINTER_FLAG_UPDATE,
            Phase::Up => POINTER_FLAG_PRIMARY | POINTER_FLAG_UP,
        };

        let mut pen = POINTER_PEN_INFO::default();
        pen.pointerInfo.pointerType = PT_PEN;
        pen.pointerInfo.pointerFlags = flags;
        pen.pointerInfo.ptPixelLocation = POINT {
            x: sample.x,
            y: sample.y,
        };
        if let Some(pressure) = sample.pressure {
            pen.penMask |= PEN_MASK_PRESSURE;
            pen.pressure = pressure;
        }
        if let Some((tilt_x, tilt_y)) = sample.tilt {
            pen.penMask |= PEN_MASK_TILT_X | PEN_MASK_TILT_Y;
            pen.tiltX = tilt_x;
            pen.tiltY = tilt_y;
        }

        let info = POINTER_TYPE_INFO {
            r#type: PT_PEN,
            Anonymous: POINTER_TYPE_INFO_0 { penInfo: pen },
        };
        unsafe { InjectSyntheticPointerInput(self.device, &[info]) }
            .map_err(|e| InjectError::Device(format!("InjectSyntheticPointerInput: {e}")))
    }
}

impl Drop for SyntheticPen {
    fn drop(&mut self) {
        unsafe { DestroySyntheticPointerDevice(self.device) };
        debug!("Synthetic pen device destroyed");
    }
}

/// The log pane: a LogBuffer whose every change is mirrored into the edit
/// control.
struct EditLog {
    edit: HWND,
    buffer: LogBuffer,
}

impl EditLog {
    fn send_text(&self, msg: u32, wparam: usize, text: &str) {
        let wide: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe {
            SendMessageW(
                self.edit,
                msg,
                Some(WPARAM(wparam)),
                Some(LPARAM(wide.as_ptr() as isize)),
            );
        }
    }

    fn select(&self, start: usize, end: usize) {
        unsafe {
            SendMessageW(self.edit, EM_SETSEL, Some(WPARAM(start)), Some(LPARAM(end as isize)));
        }
    }
}

impl LogSink for EditLog {
    fn write_line(&mut self, line: &str) {
        if let Some(evicted) = self.buffer.push(line) {
            // The oldest line leads the control's text; cut it with its CRLF.
            let units = evicted.encode_utf16().count() + 2;
            self.select(0, units);
            self.send_text(EM_REPLACESEL, 0, "");
        }
        let end = unsafe { GetWindowTextLengthW(self.edit) }.max(0) as usize;
        self.select(end, end);
        self.send_text(EM_REPLACESEL, 0, &format!("{line}\r\n"));
        unsafe {
            SendMessageW(self.edit, EM_SCROLLCARET, None, None);
        }
    }
}

/// The log and control fonts for one DPI. Both are deleted on drop.
struct Fonts {
    log: HFONT,
    ui: HFONT,
}

fn create_font(face: &str, dpi: u32) -> anyhow::Result<HFONT> {
    let mut logfont = LOGFONTW {
        lfHeight: -layout::font_height(dpi),
        lfWeight: FW_NORMAL,
        lfCharSet: DEFAULT_CHARSET,
        lfQuality: ANTIALIASED_QUALITY,
        ..Default::default()
    };
    // Leave room for the terminating NUL.
    let limit = logfont.lfFaceName.len() - 1;
    for (slot, unit) in logfont.lfFaceName.iter_mut().zip(face.encode_utf16().take(limit)) {
        *slot = unit;
    }
    let font = unsafe { CreateFontIndirectW(&logfont) };
    if font.is_invalid() {
        anyhow::bail!("CreateFontIndirectW failed for {face}");
    }
    Ok(font)
}

impl Fonts {
    fn new(dpi: u32) -> anyhow::Result<Self> {
        let log = create_font("Consolas", dpi)?;
        let ui = match create_font("Segoe UI", dpi) {
            Ok(ui) => ui,
            Err(e) => {
                let _ = unsafe { DeleteObject(log.into()) };
                return Err(e);
            }
        };
        Ok(Fonts { log, ui })
    }
}

impl Drop for Fonts {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.log.into());
            let _ = DeleteObject(self.ui.into());
        }
    }
}

fn set_font(hwnd: HWND, font: HFONT) {
    unsafe {
        SendMessageW(hwnd, WM_SETFONT, Some(WPARAM(font.0 as usize)), Some(LPARAM(1)));
    }
}

struct ShellState {
    hwnd: HWND,
    fonts: Option<Fonts>,
    toggles: Toggles,
    dispatcher: Dispatcher,
    log: EditLog,
    checkboxes: Vec<(Toggle, HWND)>,
    inject_button: HWND,
    injector: Injector,
    inject_interval: Duration,
    notice_tx: Sender<InjectorNotice>,
    notice_rx: Receiver<InjectorNotice>,
    started: Instant,
}

thread_local! {
    static SHELL: RefCell<Option<ShellState>> = const { RefCell::new(None) };
}

/// What the window procedure does after the shell state is released.
enum After {
    Reply(LRESULT),
    DefaultProc,
    Notices(Vec<InjectorNotice>),
    Alert(String),
}

fn show_message(hwnd: Option<HWND>, text: &str, caption: &str, style: MESSAGEBOX_STYLE) {
    unsafe {
        MessageBoxW(hwnd, &HSTRING::from(text), &HSTRING::from(caption), style);
    }
}

fn create_child(
    parent: HWND,
    class: PCWSTR,
    text: &str,
    style: u32,
    id: u16,
    instance: HINSTANCE,
) -> windows::core::Result<HWND> {
    unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class,
            &HSTRING::from(text),
            WS_CHILD | WS_VISIBLE | WINDOW_STYLE(style),
            0,
            0,
            0,
            0,
            Some(parent),
            Some(HMENU(id as usize as *mut c_void)),
            Some(instance),
            None,
        )
    }
}

fn move_to(hwnd: HWND, rect: &Rect) {
    let _ = unsafe { MoveWindow(hwnd, rect.left, rect.top, rect.width(), rect.height(), true) };
}

impl ShellState {
    fn current_layout(&self) -> Option<Layout> {
        let dpi = unsafe { GetDpiForWindow(self.hwnd) };
        let mut client = RECT::default();
        unsafe { GetClientRect(self.hwnd, &mut client) }.ok()?;
        Some(Layout::compute(
            client.right - client.left,
            client.bottom - client.top,
            dpi,
            self.checkboxes.len(),
        ))
    }

    fn layout(&self) {
        let Some(layout) = self.current_layout() else {
            return;
        };
        for ((_, checkbox), rect) in self.checkboxes.iter().zip(&layout.checkboxes) {
            move_to(*checkbox, rect);
        }
        move_to(self.inject_button, &layout.inject_button);
        move_to(self.log.edit, &layout.log);
    }

    /// Re-creates the fonts for `dpi` and hands them to every control. The
    /// previous fonts are deleted once nothing uses them.
    fn apply_fonts(&mut self, dpi: u32) {
        let fonts = match Fonts::new(dpi) {
            Ok(fonts) => fonts,
            Err(e) => {
                warn!(error = %format!("{e:#}"), dpi, "Keeping the previous fonts");
                return;
            }
        };
        set_font(self.log.edit, fonts.log);
        for (_, checkbox) in &self.checkboxes {
            set_font(*checkbox, fonts.ui);
        }
        set_font(self.inject_button, fonts.ui);
        self.fonts = Some(fonts);
    }

    fn on_dpi_changed(&mut self, wparam: WPARAM, lparam: LPARAM) -> After {
        let dpi = u32::from(hiword(wparam.0));
        debug!(dpi, "DPI changed");
        self.apply_fonts(dpi);
        if lparam.0 != 0 {
            // lParam points at the suggested window rectangle for the new DPI.
            let suggested = unsafe { *(lparam.0 as *const RECT) };
            let _ = unsafe {
                SetWindowPos(
                    self.hwnd,
                    None,
                    suggested.left,
                    suggested.top,
                    suggested.right - suggested.left,
                    suggested.bottom - suggested.top,
                    SWP_NOZORDER | SWP_NOACTIVATE,
                )
            };
        }
        // The WM_SIZE sent by SetWindowPos arrives while the state is borrowed.
        self.layout();
        After::Reply(LRESULT(0))
    }

    fn on_command(&mut self, id: u16, code: u16) -> After {
        if code != BN_CLICKED {
            return After::DefaultProc;
        }
        if id == ID_INJECT {
            return self.start_injection();
        }
        let Some(toggle) = id
            .checked_sub(ID_TOGGLE_BASE)
            .and_then(|index| Toggle::ALL.get(index as usize).copied())
        else {
            return After::DefaultProc;
        };
        let enabled = self.toggles.toggle(toggle);
        info!(toggle = toggle.label(), enabled, "Toggle changed");
        After::Reply(LRESULT(0))
    }

    fn start_injection(&mut self) -> After {
        // Centre the stroke in the input area so it comes back through the
        // window procedure, then convert to screen coordinates.
        let Some(layout) = self.current_layout() else {
            return After::Alert("Unable to locate the input area.".to_string());
        };
        let extent = InjectionScript::stroke((0, 0)).extent();
        let (x, y) = layout.injection_origin(extent);
        let mut origin = POINT { x, y };
        let _ = unsafe { ClientToScreen(self.hwnd, &mut origin) };

        match self.injector.start(
            InjectionScript::stroke((origin.x, origin.y)),
            self.inject_interval,
            SyntheticPen::new,
            self.notice_tx.clone(),
        ) {
            Ok(_) => After::Reply(LRESULT(0)),
            Err(InjectError::Busy) => {
                warn!("Synthetic input already running");
                After::Alert("Synthetic input is already running.".to_string())
            }
            Err(e) => {
                error!(error = %e, "Failed to start synthetic input");
                After::Alert(e.to_string())
            }
        }
    }

    fn on_message(&mut self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> After {
        let mut record = EventRecord::new(msg, wparam.0, lparam.0);
        if msg == WM_TOUCHHITTESTING && lparam.0 != 0 {
            // lParam points at the host's TOUCH_HIT_TESTING_INPUT for the
            // duration of this message.
            let input = unsafe { &*(lparam.0 as *const TOUCH_HIT_TESTING_INPUT) };
            record = record.with_hit_test(HitTestInput {
                pointer_id: input.pointerId,
                x: input.point.x,
                y: input.point.y,
                orientation: input.orientation,
            });
        }

        let now_ms = self.started.elapsed().as_millis() as u64;
        match self.dispatcher.dispatch(&record, now_ms, &self.toggles, &mut self.log) {
            Disposition::Handled(value) => After::Reply(LRESULT(value)),
            Disposition::Default => After::DefaultProc,
        }
    }

    fn handle(&mut self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> After {
        match msg {
            WM_SIZE => {
                self.layout();
                After::DefaultProc
            }
            WM_COMMAND => {
                let id = (wparam.0 & 0xFFFF) as u16;
                let code = ((wparam.0 >> 16) & 0xFFFF) as u16;
                self.on_command(id, code)
            }
            WM_DPICHANGED => self.on_dpi_changed(wparam, lparam),
            WM_TIMER if wparam.0 == NOTICE_TIMER => After::Notices(self.notice_rx.try_iter().collect()),
            _ => self.on_message(msg, wparam, lparam),
        }
    }
}

extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if msg == WM_DESTROY {
        unsafe { PostQuitMessage(0) };
        return LRESULT(0);
    }

    // Messages sent while the state is borrowed (modal loops, creation)
    // get default handling.
    let after = SHELL.with(|shell| match shell.try_borrow_mut() {
        Ok(mut slot) => match slot.as_mut() {
            Some(state) => state.handle(msg, wparam, lparam),
            None => After::DefaultProc,
        },
        Err(_) => After::DefaultProc,
    });

    match after {
        After::Reply(result) => result,
        After::DefaultProc => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        After::Notices(notices) => {
            for notice in notices {
                let style = match notice {
                    InjectorNotice::Completed { .. } => MB_OK | MB_ICONINFORMATION,
                    InjectorNotice::Failed { .. } => MB_OK | MB_ICONERROR,
                };
                show_message(Some(hwnd), &notice.to_string(), "Synthetic Input", style);
            }
            LRESULT(0)
        }
        After::Alert(text) => {
            show_message(Some(hwnd), &text, "Synthetic Input", MB_OK | MB_ICONWARNING);
            LRESULT(0)
        }
    }
}

fn create_shell(cfg: &Config) -> anyhow::Result<ShellState> {
    let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW")?.into();
    let class_name = w!("PointerTraceWindow");

    let class = WNDCLASSW {
        hInstance: instance,
        lpszClassName: class_name,
        lpfnWndProc: Some(wnd_proc),
        style: CS_HREDRAW | CS_VREDRAW,
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.context("LoadCursorW")?,
        hbrBackground: unsafe { GetSysColorBrush(COLOR_BTNFACE) },
        ..Default::default()
    };
    if unsafe { RegisterClassW(&class) } == 0 {
        anyhow::bail!("RegisterClassW failed");
    }

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            w!("Pointer Trace"),
            WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            1000,
            700,
            None,
            None,
            Some(instance),
            None,
        )
    }
    .context("CreateWindowExW")?;

    let mut checkboxes = Vec::with_capacity(Toggle::ALL.len());
    for (index, toggle) in Toggle::ALL.into_iter().enumerate() {
        let checkbox = create_child(
            hwnd,
            w!("BUTTON"),
            toggle.label(),
            WS_TABSTOP.0 | BS_AUTOCHECKBOX,
            ID_TOGGLE_BASE + index as u16,
            instance,
        )
        .with_context(|| format!("creating the {} checkbox", toggle.label()))?;
        if cfg.toggles.get(toggle) {
            unsafe {
                SendMessageW(checkbox, BM_SETCHECK, Some(WPARAM(BST_CHECKED)), None);
            }
        }
        checkboxes.push((toggle, checkbox));
    }

    let inject_button = create_child(hwnd, w!("BUTTON"), "Inject", WS_TABSTOP.0 | BS_PUSHBUTTON, ID_INJECT, instance)
        .context("creating the Inject button")?;
    let edit = create_child(
        hwnd,
        w!("EDIT"),
        "",
        // Disabled, so input over the log pane still reaches the window.
        WS_DISABLED.0 | WS_BORDER.0 | WS_VSCROLL.0 | ES_MULTILINE | ES_AUTOVSCROLL | ES_READONLY,
        ID_LOG,
        instance,
    )
    .context("creating the log pane")?;
    unsafe {
        // No text limit; the LogBuffer cap bounds the content.
        SendMessageW(edit, EM_SETLIMITTEXT, Some(WPARAM(0)), None);
    }

    let (notice_tx, notice_rx) = unbounded();
    Ok(ShellState {
        hwnd,
        fonts: None,
        toggles: cfg.toggles,
        dispatcher: Dispatcher::new(),
        log: EditLog {
            edit,
            buffer: LogBuffer::new(cfg.max_log_lines),
        },
        checkboxes,
        inject_button,
        injector: Injector::new(),
        inject_interval: cfg.inject_interval(),
        notice_tx,
        notice_rx,
        started: Instant::now(),
    })
}

/// Registers the window for every pointer, touch and device notification the
/// trace covers. Failures are logged; the window still traces what it gets.
fn register_input(hwnd: HWND, mouse_in_pointer: bool) {
    if let Err(e) = unsafe { EnableMouseInPointer(mouse_in_pointer) } {
        warn!(error = %e, "EnableMouseInPointer failed");
    }
    if let Err(e) = unsafe { RegisterPointerDeviceNotifications(hwnd, true) } {
        warn!(error = %e, "RegisterPointerDeviceNotifications failed");
    }
    if let Err(e) = unsafe { RegisterTouchWindow(hwnd, REGISTER_TOUCH_WINDOW_FLAGS(0)) } {
        warn!(error = %e, "RegisterTouchWindow failed");
    }
    if let Err(e) = unsafe { RegisterTouchHitTestingWindow(hwnd, TOUCH_HIT_TESTING_CLIENT) } {
        warn!(error = %e, "RegisterTouchHitTestingWindow failed");
    }
}

/// Runs the window shell until the window is closed.
pub fn run(cfg: &Config) -> anyhow::Result<()> {
    let mut state = match create_shell(cfg) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Window creation failed");
            show_message(None, "Unable to create main window?", "Fatal Error", MB_OK | MB_ICONERROR);
            return Ok(());
        }
    };

    let hwnd = state.hwnd;
    register_input(hwnd, cfg.toggles.mouse_in_pointer);
    state.apply_fonts(unsafe { GetDpiForWindow(hwnd) });
    state.layout();
    SHELL.with(|shell| *shell.borrow_mut() = Some(state));

    unsafe {
        SetTimer(Some(hwnd), NOTICE_TIMER, NOTICE_POLL_MS, None);
        let _ = ShowWindow(hwnd, SW_SHOWDEFAULT);
    }
    info!("Window shell running");

    let mut msg = MSG::default();
    while unsafe { GetMessageW(&mut msg, None, 0, 0) }.as_bool() {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    if let Some(state) = SHELL.with(|shell| shell.borrow_mut().take()) {
        info!(
            log_lines = state.log.buffer.len(),
            evicted = state.log.buffer.evicted(),
            "Window shell closed"
        );
        report_stats(&state.dispatcher, &state.toggles, cfg.stats_json, std::io::stderr())?;
    }
    Ok(())
}
