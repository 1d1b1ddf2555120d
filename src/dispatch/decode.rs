//! Bitfield decoders. Pure, total functions over raw parameter words; only
//! known bit positions are inspected.

use super::names::Source;
use crate::event::{self, EventRecord};

const POINTER_MESSAGE_FLAG_NEW: u16 = 0x0001;
const POINTER_MESSAGE_FLAG_INRANGE: u16 = 0x0002;
const POINTER_MESSAGE_FLAG_INCONTACT: u16 = 0x0004;
const POINTER_MESSAGE_FLAG_FIRSTBUTTON: u16 = 0x0010;
const POINTER_MESSAGE_FLAG_SECONDBUTTON: u16 = 0x0020;
const POINTER_MESSAGE_FLAG_THIRDBUTTON: u16 = 0x0040;
const POINTER_MESSAGE_FLAG_FOURTHBUTTON: u16 = 0x0080;
const POINTER_MESSAGE_FLAG_FIFTHBUTTON: u16 = 0x0100;
const POINTER_MESSAGE_FLAG_PRIMARY: u16 = 0x2000;

const MK_LBUTTON: u16 = 0x0001;
const MK_RBUTTON: u16 = 0x0002;
const MK_SHIFT: u16 = 0x0004;
const MK_CONTROL: u16 = 0x0008;
const MK_MBUTTON: u16 = 0x0010;
const MK_XBUTTON1: u16 = 0x0020;
const MK_XBUTTON2: u16 = 0x0040;

static DEVICE_CHANGE_NAMES: phf::Map<u32, &'static str> = phf::phf_map! {
    0x001u32 => "PDC_ARRIVAL",
    0x002u32 => "PDC_REMOVAL",
    0x004u32 => "PDC_ORIENTATION_0",
    0x008u32 => "PDC_ORIENTATION_90",
    0x010u32 => "PDC_ORIENTATION_180",
    0x020u32 => "PDC_ORIENTATION_270",
    0x040u32 => "PDC_MODE_DEFAULT",
    0x080u32 => "PDC_MODE_CENTERED",
    0x100u32 => "PDC_MAPPING_CHANGE",
    0x200u32 => "PDC_RESOLUTION",
    0x400u32 => "PDC_ORIGIN",
    0x800u32 => "PDC_MODE_ASPECTRATIOPRESERVED",
};

#[inline]
fn btn(down: bool) -> &'static str {
    if down {
        "X"
    } else {
        " "
    }
}

#[inline]
fn facet(set: bool, name: &'static str, negated: &'static str) -> &'static str {
    if set {
        name
    } else {
        negated
    }
}

/// Decodes the pointer flags carried in `HIWORD(wParam)` of the
/// `WM_POINTER*` family.
pub fn pointer_state(wparam: usize) -> String {
    let flags = event::hiword(wparam);
    let has = |flag: u16| flags & flag == flag;
    format!(
        "{} {} {} {} [{}|{}|{}|{}|{}]",
        facet(has(POINTER_MESSAGE_FLAG_NEW), "NEW", "!NEW"),
        facet(has(POINTER_MESSAGE_FLAG_INRANGE), "INRANGE", "!INRANGE"),
        facet(has(POINTER_MESSAGE_FLAG_INCONTACT), "INCONTACT", "!INCONTACT"),
        facet(has(POINTER_MESSAGE_FLAG_PRIMARY), "PRIMARY", "!PRIMARY"),
        btn(has(POINTER_MESSAGE_FLAG_FIRSTBUTTON)),
        btn(has(POINTER_MESSAGE_FLAG_SECONDBUTTON)),
        btn(has(POINTER_MESSAGE_FLAG_THIRDBUTTON)),
        btn(has(POINTER_MESSAGE_FLAG_FOURTHBUTTON)),
        btn(has(POINTER_MESSAGE_FLAG_FIFTHBUTTON)),
    )
}

/// Decodes the `MK_*` key-state flags in `LOWORD(wParam)` of the mouse
/// message family. Buttons are listed left, right, middle, X1, X2.
pub fn mouse_state(wparam: usize) -> String {
    let keys = event::loword(wparam);
    let has = |flag: u16| keys & flag != 0;
    format!(
        "{} {} [{}|{}|{}|{}|{}]",
        facet(has(MK_SHIFT), "SHIFT", "!SHIFT"),
        facet(has(MK_CONTROL), "CTRL", "!CTRL"),
        btn(has(MK_LBUTTON)),
        btn(has(MK_RBUTTON)),
        btn(has(MK_MBUTTON)),
        btn(has(MK_XBUTTON1)),
        btn(has(MK_XBUTTON2)),
    )
}

/// Names a `WM_POINTERDEVICECHANGE` code; unknown codes render as decimal.
pub fn device_change(code: usize) -> String {
    u32::try_from(code)
        .ok()
        .and_then(|c| DEVICE_CHANGE_NAMES.get(&c))
        .map_or_else(|| code.to_string(), |name| (*name).to_string())
}

/// Renders one derived field. `None` when the record does not carry the
/// data, which only happens for hit-test fields without a copied structure.
pub fn render(source: Source, record: &EventRecord) -> Option<String> {
    let wparam = record.wparam;
    let lparam = record.lparam;
    let value = match source {
        Source::PointerId => event::pointer_id(wparam).to_string(),
        Source::HitTestCode | Source::XButton => event::hiword(wparam).to_string(),
        Source::PointerState => pointer_state(wparam),
        Source::PointerWheelDelta | Source::MouseWheelDelta => event::wheel_delta(wparam).to_string(),
        Source::DeviceChange => device_change(wparam),
        Source::MouseState => mouse_state(wparam),
        Source::X => event::x_lparam(lparam).to_string(),
        Source::Y => event::y_lparam(lparam).to_string(),
        Source::WParam => wparam.to_string(),
        Source::LParam => lparam.to_string(),
        Source::LParamLow => event::loword(lparam as usize).to_string(),
        Source::LParamHigh => event::hiword(lparam as usize).to_string(),
        Source::HitTestPointerId => record.hit_test?.pointer_id.to_string(),
        Source::HitTestX => record.hit_test?.x.to_string(),
        Source::HitTestY => record.hit_test?.y.to_string(),
        Source::HitTestOrientation => record.hit_test?.orientation.to_string(),
    };
    Some(value)
}
