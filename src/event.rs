//! Raw event records and the word-unpacking helpers that mirror the
//! `windowsx.h`/`winuser.h` macros.

use crate::dispatch::names::resolve_kind;
use std::io::{self, BufRead};
use thiserror::Error;

/// One input notification as delivered by the host: a message id and its two
/// parameter words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventRecord {
    pub kind: u32,
    pub wparam: usize,
    pub lparam: isize,
    /// Copied out of the `TOUCH_HIT_TESTING_INPUT` that accompanies
    /// `WM_TOUCHHITTESTING`. `None` for every other kind.
    pub hit_test: Option<HitTestInput>,
}

impl EventRecord {
    pub fn new(kind: u32, wparam: usize, lparam: isize) -> Self {
        EventRecord {
            kind,
            wparam,
            lparam,
            hit_test: None,
        }
    }

    pub fn with_hit_test(mut self, hit_test: HitTestInput) -> Self {
        self.hit_test = Some(hit_test);
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitTestInput {
    pub pointer_id: u32,
    pub x: i32,
    pub y: i32,
    pub orientation: u32,
}

#[inline]
pub fn loword(word: usize) -> u16 {
    (word & 0xFFFF) as u16
}

#[inline]
pub fn hiword(word: usize) -> u16 {
    ((word >> 16) & 0xFFFF) as u16
}

#[inline]
pub fn pointer_id(wparam: usize) -> u16 {
    loword(wparam)
}

/// `GET_WHEEL_DELTA_WPARAM`: the signed high word.
#[inline]
pub fn wheel_delta(wparam: usize) -> i16 {
    hiword(wparam) as i16
}

/// `GET_X_LPARAM`: the sign-extended low word.
#[inline]
pub fn x_lparam(lparam: isize) -> i32 {
    i32::from(loword(lparam as usize) as i16)
}

/// `GET_Y_LPARAM`: the sign-extended high word.
#[inline]
pub fn y_lparam(lparam: isize) -> i32 {
    i32::from(hiword(lparam as usize) as i16)
}

/// `MAKELPARAM(x, y)` for signed screen coordinates.
#[inline]
pub fn make_lparam(x: i32, y: i32) -> isize {
    let lo = u32::from(x as u16);
    let hi = u32::from(y as u16);
    ((hi << 16) | lo) as isize
}

/// Why a headless record line was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected `TIME_MS KIND WPARAM LPARAM`, found {0} field(s)")]
    FieldCount(usize),
    #[error("invalid timestamp `{0}`")]
    Time(String),
    #[error("unknown message kind `{0}`")]
    Kind(String),
    #[error("invalid wParam `{0}`")]
    WParam(String),
    #[error("invalid lParam `{0}`")]
    LParam(String),
    #[error("line is not valid UTF-8")]
    Encoding,
}

/// A record read by the headless shell, stamped with its own clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedRecord {
    pub time_ms: u64,
    pub record: EventRecord,
}

fn parse_unsigned(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn parse_signed(text: &str) -> Option<i64> {
    match text.strip_prefix('-') {
        Some(rest) => parse_unsigned(rest).and_then(|v| i64::try_from(v).ok()).map(|v| -v),
        None => parse_unsigned(text).map(|v| v as i64),
    }
}

/// Parses one headless record line. Returns `Ok(None)` for blank lines and
/// `#` comments.
///
/// Syntax: `TIME_MS KIND WPARAM LPARAM`, where `KIND` is a message name or
/// number and `LPARAM` may be written as `x,y`.
pub fn parse_record(line: &str) -> Result<Option<TimedRecord>, RecordError> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [time, kind, wparam, lparam] = fields.as_slice() else {
        return Err(RecordError::FieldCount(fields.len()));
    };

    let time_ms = parse_unsigned(time).ok_or_else(|| RecordError::Time(time.to_string()))?;
    let kind = resolve_kind(kind).ok_or_else(|| RecordError::Kind(kind.to_string()))?;
    let wparam = parse_unsigned(wparam)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| RecordError::WParam(wparam.to_string()))?;

    let lparam = match lparam.split_once(',') {
        Some((x, y)) => {
            let x = x.trim().parse::<i32>();
            let y = y.trim().parse::<i32>();
            match (x, y) {
                (Ok(x), Ok(y)) => make_lparam(x, y),
                _ => return Err(RecordError::LParam(lparam.to_string())),
            }
        }
        None => parse_signed(lparam)
            .and_then(|v| isize::try_from(v).ok())
            .ok_or_else(|| RecordError::LParam(lparam.to_string()))?,
    };

    Ok(Some(TimedRecord {
        time_ms,
        record: EventRecord::new(kind, wparam, lparam),
    }))
}

/// Reads the next well-formed record from the reader. Returns `Ok(None)` on
/// EOF. Malformed lines, including ones that are not UTF-8, are logged and
/// skipped.
pub fn read_record(reader: &mut impl BufRead, line_no: &mut u64) -> io::Result<Option<TimedRecord>> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        *line_no += 1;
        let parsed = std::str::from_utf8(&buf)
            .map_err(|_| RecordError::Encoding)
            .and_then(parse_record);
        match parsed {
            Ok(Some(record)) => return Ok(Some(record)),
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = *line_no, error = %e, "Skipping malformed record");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::names::{WM_MOUSEMOVE, WM_POINTERDOWN};

    #[test]
    fn coordinate_words_are_sign_extended() {
        let lparam = make_lparam(-5, 20);
        assert_eq!(x_lparam(lparam), -5);
        assert_eq!(y_lparam(lparam), 20);
        assert_eq!(make_lparam(10, 20), 0x0014_000A);
    }

    #[test]
    fn wheel_delta_is_signed_high_word() {
        assert_eq!(wheel_delta(0xFF88_0000), -120);
        assert_eq!(wheel_delta(0x0078_0001), 120);
        assert_eq!(pointer_id(0x0078_0001), 1);
    }

    #[test]
    fn parses_named_record_with_packed_coordinates() {
        let parsed = parse_record("15 WM_POINTERDOWN 0x3 10,20").unwrap().unwrap();
        assert_eq!(parsed.time_ms, 15);
        assert_eq!(parsed.record, EventRecord::new(WM_POINTERDOWN, 3, 0x0014_000A));
    }

    #[test]
    fn parses_numeric_kind_and_negative_lparam() {
        let parsed = parse_record("0 512 0 -1 # trailing comment").unwrap().unwrap();
        assert_eq!(parsed.record.kind, WM_MOUSEMOVE);
        assert_eq!(parsed.record.lparam, -1);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_record("   "), Ok(None));
        assert_eq!(parse_record("# just a note"), Ok(None));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_record("1 WM_POINTERDOWN 3"), Err(RecordError::FieldCount(3)));
        assert_eq!(
            parse_record("x WM_POINTERDOWN 3 0"),
            Err(RecordError::Time("x".to_string()))
        );
        assert_eq!(
            parse_record("1 WM_NOPE 3 0"),
            Err(RecordError::Kind("WM_NOPE".to_string()))
        );
        assert_eq!(
            parse_record("1 WM_POINTERDOWN 1,2 0"),
            Err(RecordError::WParam("1,2".to_string()))
        );
        assert_eq!(
            parse_record("1 WM_POINTERDOWN 3 a,b"),
            Err(RecordError::LParam("a,b".to_string()))
        );
    }

    #[test]
    fn read_record_skips_bad_lines_and_stops_at_eof() {
        let input = "# header\n1 WM_POINTERDOWN 3 10,20\nbogus\n2 WM_POINTERUP 3 10,20\n";
        let mut reader = io::Cursor::new(input);
        let mut line_no = 0;
        let first = read_record(&mut reader, &mut line_no).unwrap().unwrap();
        assert_eq!(first.time_ms, 1);
        let second = read_record(&mut reader, &mut line_no).unwrap().unwrap();
        assert_eq!(second.time_ms, 2);
        assert_eq!(line_no, 4);
        assert!(read_record(&mut reader, &mut line_no).unwrap().is_none());
    }

    #[test]
    fn read_record_skips_lines_that_are_not_utf8() {
        let input: &[u8] = b"0 WM_POINTERDOWN 0x3 10,20\n\xff\xfe bogus\n10 WM_POINTERUP 0x3 10,20\n";
        let mut reader = io::Cursor::new(input);
        let mut line_no = 0;
        assert_eq!(read_record(&mut reader, &mut line_no).unwrap().unwrap().time_ms, 0);
        let after = read_record(&mut reader, &mut line_no).unwrap().unwrap();
        assert_eq!(after.time_ms, 10);
        assert_eq!(line_no, 3);
        assert!(read_record(&mut reader, &mut line_no).unwrap().is_none());
    }
}
