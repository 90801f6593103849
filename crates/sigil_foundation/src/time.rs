//! Duration parsing and formatting.
//!
//! Durations are written as one or more `<integer><unit>` groups with no
//! separators, e.g. `5m4s` or `1h30m`. Units are case-insensitive.

use std::time::Duration;

/// Converts duration text into a [`Duration`].
///
/// Implementations must be pure: the same text always yields the same result.
pub trait DurationParser: Send + Sync {
    /// Parses `text`, returning `None` if it is not a well-formed duration.
    fn parse(&self, text: &str) -> Option<Duration>;
}

/// The default parser, accepting week/day/hour/minute/second units.
///
/// | Unit    | Spellings                           |
/// |---------|-------------------------------------|
/// | weeks   | `w`, `wk`, `wks`, `week`, `weeks`   |
/// | days    | `d`, `day`, `days`                  |
/// | hours   | `h`, `hr`, `hrs`, `hour`, `hours`   |
/// | minutes | `m`, `min`, `mins`, `minute(s)`     |
/// | seconds | `s`, `sec`, `secs`, `second(s)`     |
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitDurationParser;

impl UnitDurationParser {
    fn unit_seconds(unit: &str) -> Option<u64> {
        match unit {
            "w" | "wk" | "wks" | "week" | "weeks" => Some(7 * 86_400),
            "d" | "day" | "days" => Some(86_400),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(3_600),
            "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
            "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
            _ => None,
        }
    }
}

impl DurationParser for UnitDurationParser {
    fn parse(&self, text: &str) -> Option<Duration> {
        let text = text.trim().to_ascii_lowercase();
        if text.is_empty() {
            return None;
        }

        let mut total: u64 = 0;
        let mut chars = text.chars().peekable();

        while chars.peek().is_some() {
            let mut digits = String::new();
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                chars.next();
            }

            let mut unit = String::new();
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_alphabetic() {
                    break;
                }
                unit.push(c);
                chars.next();
            }

            if digits.is_empty() || unit.is_empty() {
                return None;
            }

            let amount: u64 = digits.parse().ok()?;
            let seconds = amount.checked_mul(Self::unit_seconds(&unit)?)?;
            total = total.checked_add(seconds)?;
        }

        Some(Duration::from_secs(total))
    }
}

/// Formats a duration in the compact `1h2m3s` form, omitting zero units.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut remaining = duration.as_secs();
    if remaining == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, size) in [("w", 7 * 86_400), ("d", 86_400), ("h", 3_600), ("m", 60), ("s", 1)] {
        let count = remaining / size;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push_str(unit);
            remaining %= size;
        }
    }
    out
}
