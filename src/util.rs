//! Utility functions shared across modules.

use std::time::Duration;

/// Formats a raw parameter word as zero-padded hexadecimal (`0x0000002a`).
/// Values wider than 32 bits keep all their digits.
#[inline]
pub fn format_word(word: usize) -> String {
    format!("{word:#010x}")
}

/// Formats a `std::time::Duration` into a human-readable string using `humantime`.
#[inline]
pub fn format_duration(duration: Duration) -> String {
    humantime::format_duration(duration).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_padded_to_eight_digits() {
        assert_eq!(format_word(3), "0x00000003");
        assert_eq!(format_word(0x0014_000A), "0x0014000a");
        assert_eq!(format_word(0x1_0000_0000), "0x100000000");
    }

    #[test]
    fn durations_use_humantime() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
