//! Shot filename conventions
//!
//! Capture devices name shot files after the local capture time, e.g.
//! `20190202T141820.shot`. The embedded timestamp is the sort key and the
//! target of date-bound filters.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Suffix every listed shot file must carry
pub const SHOT_SUFFIX: &str = ".shot";

/// Format of the embedded timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{4})(\d{2})(\d{2})T(\d{2})(\d{2})(\d{2})")
        .expect("timestamp pattern compiles")
});

/// Check whether `name` ends with the shot suffix.
pub fn is_shot_file(name: &str) -> bool {
    name.ends_with(SHOT_SUFFIX)
}

/// The embedded timestamp text, normalised to an upper-case `T`.
pub fn timestamp_key(name: &str) -> Option<String> {
    TIMESTAMP_PATTERN
        .find(name)
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Parse the embedded capture time. Returns `None` when the name carries no
/// timestamp or the digits do not form a real date.
pub fn parse_datetime(name: &str) -> Option<NaiveDateTime> {
    let caps = TIMESTAMP_PATTERN.captures(name)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?.and_hms_opt(field(4)?, field(5)?, field(6)?)
}

/// Render a capture time the way shot files are named.
pub fn format_key(datetime: NaiveDateTime) -> String {
    datetime.format(TIMESTAMP_FORMAT).to_string()
}

fn prefix<'a>(key: &'a str, len: usize) -> &'a str {
    key.char_indices()
        .nth(len)
        .map(|(i, _)| &key[..i])
        .unwrap_or(key)
}

/// Inclusive upper bound. `latest` may be any prefix of a timestamp key, so
/// `"201903"` admits every shot taken in March 2019 or before.
pub fn within_latest(key: &str, latest: &str) -> bool {
    latest >= prefix(key, latest.chars().count())
}

/// Inclusive lower bound with the same prefix semantics as [`within_latest`].
pub fn within_earliest(key: &str, earliest: &str) -> bool {
    earliest <= prefix(key, earliest.chars().count())
}
