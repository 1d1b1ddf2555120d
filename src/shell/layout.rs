//! Window geometry for the window shell, computed from the client size and
//! DPI so it can be checked without a window.
//!
//! The client area is split top to bottom into the control row, the log pane
//! and the input area. The input area has no child window over it, so pointer
//! and mouse input there reaches the shell's own window procedure.

/// Layout units are 96-DPI pixels.
pub const BASE_DPI: u32 = 96;
pub const MARGIN: i32 = 8;
pub const ROW_HEIGHT: i32 = 24;
pub const CHECKBOX_WIDTH: i32 = 170;
pub const BUTTON_WIDTH: i32 = 90;
/// Pixel height of the log and control fonts.
pub const FONT_HEIGHT: i32 = 18;

/// A client-area rectangle, right/bottom exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains(&self, (x, y): (i32, i32)) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right && other.left < self.right && self.top < other.bottom && other.top < self.bottom
    }
}

pub fn scale(value: i32, dpi: u32) -> i32 {
    value * dpi.max(BASE_DPI) as i32 / BASE_DPI as i32
}

/// Font height for `dpi`, in pixels.
pub fn font_height(dpi: u32) -> i32 {
    scale(FONT_HEIGHT, dpi)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub checkboxes: Vec<Rect>,
    pub inject_button: Rect,
    pub log: Rect,
    pub input: Rect,
}

impl Layout {
    /// Lays out `checkbox_count` checkboxes and the Inject button in a row,
    /// the log pane over half of what remains and the input area below it.
    pub fn compute(client_width: i32, client_height: i32, dpi: u32, checkbox_count: usize) -> Self {
        let (margin, row) = (scale(MARGIN, dpi), scale(ROW_HEIGHT, dpi));
        let checkbox_width = scale(CHECKBOX_WIDTH, dpi);
        let (width, height) = (client_width.max(0), client_height.max(0));

        let mut x = margin;
        let checkboxes = (0..checkbox_count)
            .map(|_| {
                let rect = Rect {
                    left: x,
                    top: margin,
                    right: x + checkbox_width,
                    bottom: margin + row,
                };
                x += checkbox_width;
                rect
            })
            .collect();
        let inject_button = Rect {
            left: x,
            top: margin,
            right: x + scale(BUTTON_WIDTH, dpi),
            bottom: margin + row,
        };

        let top = margin * 2 + row;
        let right = (width - margin).max(margin);
        let remaining = (height - top).max(0);
        let log = Rect {
            left: margin,
            top,
            right,
            bottom: top + remaining / 2,
        };
        let input = Rect {
            left: 0,
            top: (log.bottom + margin).min(height.max(log.bottom)),
            right: width,
            bottom: height.max(log.bottom),
        };

        Layout {
            checkboxes,
            inject_button,
            log,
            input,
        }
    }

    /// Where a `size` stroke starts so that it is centred in the input area,
    /// in client coordinates. When the area is smaller than the stroke it
    /// starts at the area's top-left corner.
    pub fn injection_origin(&self, (stroke_width, stroke_height): (i32, i32)) -> (i32, i32) {
        let x = self.input.left + ((self.input.width() - stroke_width) / 2).max(0);
        let y = self.input.top + ((self.input.height() - stroke_height) / 2).max(0);
        (x, y)
    }
}
