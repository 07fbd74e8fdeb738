//! Timestamp codec - conversion between human time-codes and second counts
//!
//! Transcript entries, chat messages, and chapter markers all reference
//! playback positions as `MM:SS` or `HH:MM:SS` strings. This module is the
//! single conversion point between those strings and the second counts the
//! session understands.
//!
//! # Example
//!
//! ```rust
//! use vidya_player::timecode;
//!
//! assert_eq!(timecode::parse("01:05"), Some(65.0));
//! assert_eq!(timecode::parse("1:02:03"), Some(3723.0));
//! assert_eq!(timecode::parse("not a time"), None);
//! assert_eq!(timecode::format(65.0), "1:05");
//! ```

/// Parse a `MM:SS` or `HH:MM:SS` time-code into seconds.
///
/// Returns `None` for anything that is not a well-formed time-code:
/// missing separators, non-numeric or empty fields, negative values, or
/// out-of-range seconds/minutes. In the two-field form the minutes field is
/// unbounded so that every value produced by [`format`] parses back.
pub fn parse(text: &str) -> Option<f64> {
    let fields: Vec<&str> = text.trim().split(':').collect();
    let total = match fields.as_slice() {
        [minutes, seconds] => {
            let minutes = numeric_field(minutes)?;
            let seconds = numeric_field(seconds)?;
            if seconds >= 60 {
                return None;
            }
            minutes * 60 + seconds
        }
        [hours, minutes, seconds] => {
            let hours = numeric_field(hours)?;
            let minutes = numeric_field(minutes)?;
            let seconds = numeric_field(seconds)?;
            if minutes >= 60 || seconds >= 60 {
                return None;
            }
            hours * 3600 + minutes * 60 + seconds
        }
        _ => return None,
    };
    Some(total as f64)
}

/// Format a second count as `M:SS`, flooring to whole seconds.
///
/// Minutes are unbounded; seconds are zero-padded to two digits. Negative
/// and non-finite input renders as `0:00`.
pub fn format(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Render the `current / duration` clock label shown in the control bar.
pub fn format_clock(current: f64, duration: Option<f64>) -> String {
    match duration {
        Some(duration) => format!("{} / {}", format(current), format(duration)),
        None => format!("{} / 0:00", format(current)),
    }
}

fn numeric_field(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_field() {
        assert_eq!(parse("00:00"), Some(0.0));
        assert_eq!(parse("01:05"), Some(65.0));
        assert_eq!(parse("10:59"), Some(659.0));
        // Minutes are unbounded in the short form
        assert_eq!(parse("90:00"), Some(5400.0));
    }

    #[test]
    fn test_parse_three_field() {
        assert_eq!(parse("0:00:00"), Some(0.0));
        assert_eq!(parse("1:02:03"), Some(3723.0));
        assert_eq!(parse("01:30:00"), Some(5400.0));
        assert_eq!(parse("100:00:00"), Some(360_000.0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let malformed = [
            "", ":", "::", "105", "1:2:3:4", "aa:bb", "1:60", "1:070", "60:00:00x",
            "-1:05", "1:-5", "1e1:00", "1.5:00", "01:", ":30", "1:05:", "🎬:00",
        ];
        for input in malformed {
            assert_eq!(parse(input), None, "expected no match for {input:?}");
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse(" 1:05 "), Some(65.0));
        assert_eq!(parse("\t02:10\n"), Some(130.0));
    }

    #[test]
    fn test_format() {
        assert_eq!(format(0.0), "0:00");
        assert_eq!(format(65.0), "1:05");
        assert_eq!(format(65.9), "1:05");
        assert_eq!(format(5400.0), "90:00");
        assert_eq!(format(-3.0), "0:00");
        assert_eq!(format(f64::NAN), "0:00");
        assert_eq!(format(f64::INFINITY), "0:00");
    }

    #[test]
    fn test_round_trip() {
        for s in (0..4000).chain([5400, 36_000, 359_999]) {
            let rendered = format(s as f64);
            assert_eq!(parse(&rendered), Some(s as f64), "round trip failed at {s}s ({rendered})");
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(65.0, Some(600.0)), "1:05 / 10:00");
        assert_eq!(format_clock(0.0, None), "0:00 / 0:00");
    }
}
