//! Integration tests for duration parsing and formatting

use std::time::Duration;

use proptest::prelude::*;
use sigil_foundation::{DurationParser, UnitDurationParser, format_duration};

fn parse(text: &str) -> Option<Duration> {
    UnitDurationParser.parse(text)
}

#[test]
fn spelled_out_units() {
    assert_eq!(parse("1hour30mins"), Some(Duration::from_secs(5_400)));
    assert_eq!(parse("2weeks"), Some(Duration::from_secs(1_209_600)));
}

#[test]
fn malformed_text() {
    assert_eq!(parse(""), None);
    assert_eq!(parse("10"), None);
    assert_eq!(parse("m10"), None);
    assert_eq!(parse("10parsecs"), None);
}

#[test]
fn zero_formats_as_seconds() {
    assert_eq!(format_duration(Duration::ZERO), "0s");
}

proptest! {
    #[test]
    fn formatted_durations_parse_back(secs in 0u64..10_000_000) {
        let d = Duration::from_secs(secs);
        prop_assert_eq!(parse(&format_duration(d)), Some(d));
    }
}
