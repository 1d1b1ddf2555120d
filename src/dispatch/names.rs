//! The message table: every traced message id mapped to its symbolic name,
//! its classification and the ordered list of derived fields to log.

pub const WM_MOUSEACTIVATE: u32 = 0x0021;
pub const WM_POINTERDEVICECHANGE: u32 = 0x0238;
pub const WM_POINTERDEVICEINRANGE: u32 = 0x0239;
pub const WM_POINTERDEVICEOUTOFRANGE: u32 = 0x023A;
pub const WM_NCPOINTERUPDATE: u32 = 0x0241;
pub const WM_NCPOINTERDOWN: u32 = 0x0242;
pub const WM_NCPOINTERUP: u32 = 0x0243;
pub const WM_POINTERUPDATE: u32 = 0x0245;
pub const WM_POINTERDOWN: u32 = 0x0246;
pub const WM_POINTERUP: u32 = 0x0247;
pub const WM_POINTERENTER: u32 = 0x0249;
pub const WM_POINTERLEAVE: u32 = 0x024A;
pub const WM_POINTERACTIVATE: u32 = 0x024B;
pub const WM_POINTERCAPTURECHANGED: u32 = 0x024C;
pub const WM_TOUCHHITTESTING: u32 = 0x024D;
pub const WM_POINTERWHEEL: u32 = 0x024E;
pub const WM_POINTERHWHEEL: u32 = 0x024F;
pub const DM_POINTERHITTEST: u32 = 0x0250;
pub const WM_POINTERROUTEDTO: u32 = 0x0251;
pub const WM_POINTERROUTEDAWAY: u32 = 0x0252;
pub const WM_POINTERROUTEDRELEASED: u32 = 0x0253;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_LBUTTONDBLCLK: u32 = 0x0203;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_RBUTTONDBLCLK: u32 = 0x0206;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MBUTTONDBLCLK: u32 = 0x0209;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_XBUTTONDBLCLK: u32 = 0x020D;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;
pub const WM_MOUSELEAVE: u32 = 0x02A3;

/// `MA_ACTIVATE`: activate the window and keep the mouse message.
pub const MA_ACTIVATE: isize = 1;

/// Where a derived value comes from. Each source knows the expression it is
/// printed as; the value itself is rendered by [`super::decode::render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    PointerId,
    HitTestCode,
    PointerState,
    PointerWheelDelta,
    DeviceChange,
    MouseState,
    MouseWheelDelta,
    XButton,
    X,
    Y,
    WParam,
    LParam,
    LParamLow,
    LParamHigh,
    HitTestPointerId,
    HitTestX,
    HitTestY,
    HitTestOrientation,
}

impl Source {
    pub fn expr(self) -> &'static str {
        match self {
            Source::PointerId => "GET_POINTERID_WPARAM(wParam)",
            Source::HitTestCode | Source::XButton => "HIWORD(wParam)",
            Source::PointerState => "PointerState(wParam)",
            Source::PointerWheelDelta => "GET_WHEEL_DELTA_WPARAM(wParam)",
            Source::DeviceChange => "PDC(wParam)",
            Source::MouseState => "MouseState(wParam)",
            Source::MouseWheelDelta => "(SHORT)HIWORD(wParam)",
            Source::X => "GET_X_LPARAM(lParam)",
            Source::Y => "GET_Y_LPARAM(lParam)",
            Source::WParam => "wParam",
            Source::LParam => "lParam",
            Source::LParamLow => "LOWORD(lParam)",
            Source::LParamHigh => "HIWORD(lParam)",
            Source::HitTestPointerId => "info->pointerId",
            Source::HitTestX => "info->point.x",
            Source::HitTestY => "info->point.y",
            Source::HitTestOrientation => "info->orientation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub source: Source,
    pub desc: &'static str,
}

const fn field(source: Source, desc: &'static str) -> Field {
    Field { source, desc }
}

/// What the window procedure answers once a message has been logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Let the pointer-default rule or the default window procedure decide.
    FallThrough,
    /// Return this value and skip default processing.
    Return(isize),
}

#[derive(Clone, Copy, Debug)]
pub struct MessageInfo {
    pub name: &'static str,
    /// Continuous movement, hidden while motion events are disabled.
    pub motion: bool,
    /// Member of the closed set whose default processing can be suppressed.
    pub pointer: bool,
    pub reply: Reply,
    pub fields: &'static [Field],
}

const NO_FIELDS: &[Field] = &[];

const NC_POINTER_FIELDS: &[Field] = &[
    field(Source::PointerId, "pointer identifier"),
    field(Source::HitTestCode, "hit test value"),
    field(Source::X, "x coordinate"),
    field(Source::Y, "y coordinate"),
];

const POINTER_FIELDS: &[Field] = &[
    field(Source::PointerId, "pointer identifier"),
    field(Source::PointerState, "pointer state"),
    field(Source::X, "x coordinate"),
    field(Source::Y, "y coordinate"),
];

const POINTER_WHEEL_FIELDS: &[Field] = &[
    field(Source::PointerId, "pointer identifier"),
    field(Source::PointerWheelDelta, "wheel delta"),
    field(Source::X, "x coordinate"),
    field(Source::Y, "y coordinate"),
];

const POINTER_ACTIVATE_FIELDS: &[Field] = &[
    field(Source::PointerId, "pointer identifier"),
    field(Source::HitTestCode, "hit test value"),
    field(Source::LParam, "window being activated"),
];

const CAPTURE_CHANGED_FIELDS: &[Field] = &[
    field(Source::PointerId, "pointer identifier"),
    field(Source::LParam, "window capturing pointer"),
];

const DEVICE_CHANGE_FIELDS: &[Field] = &[
    field(Source::DeviceChange, "device change"),
    field(Source::LParam, "device handle"),
];

const TOUCH_HIT_TESTING_FIELDS: &[Field] = &[
    field(Source::HitTestPointerId, "pointer identifier"),
    field(Source::HitTestX, "x coordinate"),
    field(Source::HitTestY, "y coordinate"),
    field(Source::HitTestOrientation, "orientation"),
];

const MOUSE_MOVE_FIELDS: &[Field] = &[
    field(Source::MouseState, "pointer state"),
    field(Source::X, "x coordinate"),
    field(Source::Y, "y coordinate"),
];

const MOUSE_WHEEL_FIELDS: &[Field] = &[
    field(Source::MouseState, "pointer state"),
    field(Source::MouseWheelDelta, "wheel delta"),
    field(Source::X, "x coordinate"),
    field(Source::Y, "y coordinate"),
];

const MOUSE_ACTIVATE_FIELDS: &[Field] = &[
    field(Source::WParam, "top level window"),
    field(Source::LParamLow, "hit test value"),
    field(Source::LParamHigh, "mouse message"),
];

const BUTTON_FIELDS: &[Field] = &[
    field(Source::MouseState, "pointer state"),
    field(Source::XButton, "x button"),
    field(Source::X, "x coordinate"),
    field(Source::Y, "y coordinate"),
];

const fn pointer(name: &'static str, fields: &'static [Field]) -> MessageInfo {
    MessageInfo {
        name,
        motion: false,
        pointer: true,
        reply: Reply::FallThrough,
        fields,
    }
}

const fn other(name: &'static str, fields: &'static [Field]) -> MessageInfo {
    MessageInfo {
        name,
        motion: false,
        pointer: false,
        reply: Reply::FallThrough,
        fields,
    }
}

const fn mouse(name: &'static str, fields: &'static [Field]) -> MessageInfo {
    MessageInfo {
        name,
        motion: false,
        pointer: false,
        reply: Reply::Return(0),
        fields,
    }
}

const fn motion(info: MessageInfo) -> MessageInfo {
    MessageInfo {
        motion: true,
        ..info
    }
}

const fn replying(info: MessageInfo, value: isize) -> MessageInfo {
    MessageInfo {
        reply: Reply::Return(value),
        ..info
    }
}

static MESSAGES: phf::Map<u32, MessageInfo> = phf::phf_map! {
    0x0021u32 => replying(other("WM_MOUSEACTIVATE", MOUSE_ACTIVATE_FIELDS), MA_ACTIVATE),
    0x0238u32 => pointer("WM_POINTERDEVICECHANGE", DEVICE_CHANGE_FIELDS),
    0x0239u32 => pointer("WM_POINTERDEVICEINRANGE", NO_FIELDS),
    0x023Au32 => pointer("WM_POINTERDEVICEOUTOFRANGE", NO_FIELDS),
    0x0241u32 => motion(other("WM_NCPOINTERUPDATE", NC_POINTER_FIELDS)),
    0x0242u32 => other("WM_NCPOINTERDOWN", NC_POINTER_FIELDS),
    0x0243u32 => other("WM_NCPOINTERUP", NC_POINTER_FIELDS),
    0x0245u32 => motion(pointer("WM_POINTERUPDATE", POINTER_FIELDS)),
    0x0246u32 => pointer("WM_POINTERDOWN", POINTER_FIELDS),
    0x0247u32 => pointer("WM_POINTERUP", POINTER_FIELDS),
    0x0249u32 => pointer("WM_POINTERENTER", NO_FIELDS),
    0x024Au32 => pointer("WM_POINTERLEAVE", NO_FIELDS),
    0x024Bu32 => pointer("WM_POINTERACTIVATE", POINTER_ACTIVATE_FIELDS),
    0x024Cu32 => pointer("WM_POINTERCAPTURECHANGED", CAPTURE_CHANGED_FIELDS),
    0x024Du32 => replying(other("WM_TOUCHHITTESTING", TOUCH_HIT_TESTING_FIELDS), 0),
    0x024Eu32 => pointer("WM_POINTERWHEEL", POINTER_WHEEL_FIELDS),
    0x024Fu32 => pointer("WM_POINTERHWHEEL", POINTER_WHEEL_FIELDS),
    0x0250u32 => other("DM_POINTERHITTEST", NO_FIELDS),
    0x0251u32 => pointer("WM_POINTERROUTEDTO", NO_FIELDS),
    0x0252u32 => pointer("WM_POINTERROUTEDAWAY", NO_FIELDS),
    0x0253u32 => pointer("WM_POINTERROUTEDRELEASED", NO_FIELDS),
    0x0200u32 => motion(mouse("WM_MOUSEMOVE", MOUSE_MOVE_FIELDS)),
    0x0201u32 => mouse("WM_LBUTTONDOWN", BUTTON_FIELDS),
    0x0202u32 => mouse("WM_LBUTTONUP", BUTTON_FIELDS),
    0x0203u32 => mouse("WM_LBUTTONDBLCLK", BUTTON_FIELDS),
    0x0204u32 => mouse("WM_RBUTTONDOWN", BUTTON_FIELDS),
    0x0205u32 => mouse("WM_RBUTTONUP", BUTTON_FIELDS),
    0x0206u32 => mouse("WM_RBUTTONDBLCLK", BUTTON_FIELDS),
    0x0207u32 => mouse("WM_MBUTTONDOWN", BUTTON_FIELDS),
    0x0208u32 => mouse("WM_MBUTTONUP", BUTTON_FIELDS),
    0x0209u32 => mouse("WM_MBUTTONDBLCLK", BUTTON_FIELDS),
    0x020Au32 => mouse("WM_MOUSEWHEEL", MOUSE_WHEEL_FIELDS),
    0x020Bu32 => mouse("WM_XBUTTONDOWN", BUTTON_FIELDS),
    0x020Cu32 => mouse("WM_XBUTTONUP", BUTTON_FIELDS),
    0x020Du32 => mouse("WM_XBUTTONDBLCLK", BUTTON_FIELDS),
    0x020Eu32 => mouse("WM_MOUSEHWHEEL", MOUSE_WHEEL_FIELDS),
    0x02A3u32 => mouse("WM_MOUSELEAVE", NO_FIELDS),
};

#[inline]
pub fn message_info(kind: u32) -> Option<&'static MessageInfo> {
    MESSAGES.get(&kind)
}

#[inline]
pub fn message_name(kind: u32) -> Option<&'static str> {
    message_info(kind).map(|info| info.name)
}

/// All traced message ids, sorted.
pub fn known_kinds() -> Vec<u32> {
    let mut kinds: Vec<u32> = MESSAGES.keys().copied().collect();
    kinds.sort_unstable();
    kinds
}

/// Resolve a message identifier (numeric id or symbolic name) to a message
/// id. Numbers are accepted whether or not the table knows them; names are
/// matched case-insensitively.
pub fn resolve_kind(identifier: &str) -> Option<u32> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return None;
    }

    let numeric = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => trimmed.parse::<u32>().ok(),
    };
    if numeric.is_some() {
        return numeric;
    }

    let normalized = trimmed.to_ascii_uppercase();
    MESSAGES
        .entries()
        .find_map(|(kind, info)| (info.name == normalized).then_some(*kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_resolve() {
        for kind in known_kinds() {
            let name = message_name(kind).unwrap();
            assert_eq!(resolve_kind(name), Some(kind), "{name}");
            assert_eq!(resolve_kind(&name.to_ascii_lowercase()), Some(kind), "{name}");
        }
    }

    #[test]
    fn constants_match_table() {
        assert_eq!(message_name(WM_POINTERDOWN), Some("WM_POINTERDOWN"));
        assert_eq!(message_name(WM_MOUSEMOVE), Some("WM_MOUSEMOVE"));
        assert_eq!(message_name(WM_TOUCHHITTESTING), Some("WM_TOUCHHITTESTING"));
        assert_eq!(message_name(DM_POINTERHITTEST), Some("DM_POINTERHITTEST"));
        assert_eq!(message_name(WM_MOUSELEAVE), Some("WM_MOUSELEAVE"));
        assert_eq!(message_name(0x0010), None);
    }

    #[test]
    fn motion_class_is_exactly_the_movement_messages() {
        let motion: Vec<u32> = known_kinds()
            .into_iter()
            .filter(|k| message_info(*k).unwrap().motion)
            .collect();
        assert_eq!(motion, vec![WM_MOUSEMOVE, WM_NCPOINTERUPDATE, WM_POINTERUPDATE]);
    }

    #[test]
    fn pointer_set_has_fifteen_members() {
        let pointer: Vec<u32> = known_kinds()
            .into_iter()
            .filter(|k| message_info(*k).unwrap().pointer)
            .collect();
        assert_eq!(pointer.len(), 15);
        assert!(pointer.contains(&WM_POINTERHWHEEL));
        assert!(!pointer.contains(&WM_NCPOINTERDOWN));
        assert!(!pointer.contains(&WM_TOUCHHITTESTING));
    }

    #[test]
    fn resolves_numbers_and_rejects_unknown_names() {
        assert_eq!(resolve_kind("0x246"), Some(WM_POINTERDOWN));
        assert_eq!(resolve_kind("582"), Some(WM_POINTERDOWN));
        assert_eq!(resolve_kind("16"), Some(16));
        assert_eq!(resolve_kind("WM_BOGUS"), None);
        assert_eq!(resolve_kind(""), None);
    }
}
