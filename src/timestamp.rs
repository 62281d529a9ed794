//! Timestamp extraction from raw log lines.
//!
//! A line either starts a new entry (it carries a recognizable timestamp) or
//! continues the previous one. Recognition is driven by a [`TimestampRule`]:
//! the built-in pattern list, tried in a fixed priority order, or a single
//! user-supplied regex + strptime format pair that replaces it entirely.

use std::fmt;
use std::sync::LazyLock;

use jiff::civil::{DateTime, Time};
use jiff::fmt::strtime::BrokenDownTime;
use jiff::tz::TimeZone;
use regex::{Captures, Regex};

use crate::error::MergeError;

/// A parsed, comparable point in time.
///
/// Wraps a [`jiff::civil::DateTime`]: there is no zone attached, every
/// instant is assumed to share the same implicit zone. Resolution is
/// nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(DateTime);

impl Instant {
    pub const fn new(value: DateTime) -> Self {
        Self(value)
    }

    /// Build an instant from Unix epoch seconds, rendered as a UTC civil time.
    pub fn from_epoch(seconds: i64, nanos: i32) -> Option<Self> {
        let ts = jiff::Timestamp::new(seconds, nanos).ok()?;
        Some(Self(ts.to_zoned(TimeZone::UTC).datetime()))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.strftime("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// A pure matcher: returns the instant a line starts with, if any.
pub type Matcher = fn(&str) -> Option<Instant>;

/// Built-in matchers in priority order. First match wins.
///
/// The order is part of the contract: reordering changes which pattern
/// claims an ambiguous line.
pub const BUILTIN_MATCHERS: &[(&str, Matcher)] = &[
    ("dash-comma-millis", match_dash_comma_millis),
    ("slash-dot-fraction", match_slash_dot_fraction),
    ("unix-epoch", match_unix_epoch),
    ("iso-t-comma-millis", match_iso_t_comma_millis),
];

static DASH_COMMA_MILLIS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^([0-9]{4})-([0-9]{2})-([0-9]{2}) ([0-9]{2}):([0-9]{2}):([0-9]{2}),([0-9]{3})(?:\s|$)")
});

static SLASH_DOT_FRACTION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^([0-9]{4})/([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2}):([0-9]{2})\.([0-9]+)(?:\s|$)")
});

static UNIX_EPOCH: LazyLock<Regex> = LazyLock::new(|| compile(r"^([0-9]+)(?:\.([0-9]+))?\s"));

static ISO_T_COMMA_MILLIS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^\s*([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2}),([0-9]{3})(?:\s|$)")
});

#[allow(clippy::expect_used)] // Patterns are string literals covered by tests
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in timestamp pattern must compile")
}

/// `2023-01-01 00:00:01,000 ...`
pub fn match_dash_comma_millis(line: &str) -> Option<Instant> {
    civil_from_captures(&DASH_COMMA_MILLIS.captures(line)?)
}

/// `2023/01/01 00:00:01.123456 ...`
pub fn match_slash_dot_fraction(line: &str) -> Option<Instant> {
    civil_from_captures(&SLASH_DOT_FRACTION.captures(line)?)
}

/// `1672531200 ...` or `1672531200.25 ...`
pub fn match_unix_epoch(line: &str) -> Option<Instant> {
    let caps = UNIX_EPOCH.captures(line)?;
    let seconds = caps[1].parse::<i64>().ok()?;
    let nanos = match caps.get(2) {
        Some(frac) => fraction_to_nanos(frac.as_str())?,
        None => 0,
    };
    Instant::from_epoch(seconds, nanos)
}

/// ` 2023-01-01T00:00:01,000 ...` (leading whitespace allowed)
pub fn match_iso_t_comma_millis(line: &str) -> Option<Instant> {
    civil_from_captures(&ISO_T_COMMA_MILLIS.captures(line)?)
}

/// Try every built-in matcher in priority order.
pub fn extract_builtin(line: &str) -> Option<Instant> {
    BUILTIN_MATCHERS.iter().find_map(|(_, matcher)| matcher(line))
}

/// Build a civil datetime from seven captures: year, month, day, hour,
/// minute, second, fraction digits. Out-of-range fields yield `None`.
fn civil_from_captures(caps: &Captures<'_>) -> Option<Instant> {
    let year = caps[1].parse::<i16>().ok()?;
    let month = caps[2].parse::<i8>().ok()?;
    let day = caps[3].parse::<i8>().ok()?;
    let hour = caps[4].parse::<i8>().ok()?;
    let minute = caps[5].parse::<i8>().ok()?;
    let second = caps[6].parse::<i8>().ok()?;
    let nanos = fraction_to_nanos(&caps[7])?;
    DateTime::new(year, month, day, hour, minute, second, nanos)
        .ok()
        .map(Instant)
}

/// Convert ASCII fractional-second digits to nanoseconds. Digits past the
/// ninth are truncated; anything but ASCII digits yields `None`.
fn fraction_to_nanos(digits: &str) -> Option<i32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let kept = digits.get(..digits.len().min(9))?;
    let value = kept.parse::<i32>().ok()?;
    #[allow(clippy::cast_possible_truncation)] // kept.len() <= 9
    let scale = 10_i32.pow(9 - kept.len() as u32);
    Some(value * scale)
}

/// A user-supplied timestamp rule: a regex locating the timestamp and a
/// strptime-style format converting the captured text.
#[derive(Debug, Clone)]
pub struct CustomRule {
    regex: Regex,
    format: String,
}

impl CustomRule {
    /// Compile a custom rule. An invalid regex is a configuration error.
    pub fn new(regex: &str, format: &str) -> Result<Self, MergeError> {
        let regex = Regex::new(regex)
            .map_err(|e| MergeError::Config(format!("invalid timestamp regex: {e}")))?;
        Ok(Self {
            regex,
            format: format.to_string(),
        })
    }

    /// The timestamp text in `line`: capture group 1, or the whole match
    /// when the regex has no groups.
    fn capture<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = self.regex.captures(line)?;
        caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str())
    }

    /// Parse captured text with the rule's format. Formats without time
    /// fields resolve to midnight.
    fn parse(&self, text: &str) -> Option<Instant> {
        let tm = BrokenDownTime::parse(&self.format, text).ok()?;
        let value = if tm.hour().is_some() {
            tm.to_datetime().ok()?
        } else {
            tm.to_date().ok()?.to_datetime(Time::midnight())
        };
        Some(Instant(value))
    }
}

/// Captured text that a custom format could not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMismatch {
    pub captured: String,
    pub format: String,
}

impl fmt::Display for RuleMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "captured timestamp {:?} does not match format {:?}",
            self.captured, self.format
        )
    }
}

/// How timestamps are recognized for a whole run.
#[derive(Debug, Clone, Default)]
pub enum TimestampRule {
    /// The built-in pattern list, see [`BUILTIN_MATCHERS`].
    #[default]
    BuiltIn,
    /// A single custom regex + format pair.
    Custom(CustomRule),
}

impl TimestampRule {
    /// Build the rule from optional regex and format settings.
    ///
    /// Both absent selects the built-ins; exactly one present is a
    /// configuration error.
    pub fn from_parts(regex: Option<&str>, format: Option<&str>) -> Result<Self, MergeError> {
        match (regex, format) {
            (None, None) => Ok(Self::BuiltIn),
            (Some(regex), Some(format)) => Ok(Self::Custom(CustomRule::new(regex, format)?)),
            _ => Err(MergeError::Config(
                "timestamp regex and format must be given together".to_string(),
            )),
        }
    }

    /// Locate and parse the timestamp in `line`.
    ///
    /// `Ok(None)` means the line carries no timestamp. A custom regex that
    /// matches text its format cannot parse is a [`RuleMismatch`].
    pub fn extract(&self, line: &str) -> Result<Option<Instant>, RuleMismatch> {
        match self {
            Self::BuiltIn => Ok(extract_builtin(line)),
            Self::Custom(rule) => match rule.capture(line) {
                None => Ok(None),
                Some(text) => rule.parse(text).map(Some).ok_or_else(|| RuleMismatch {
                    captured: text.to_string(),
                    format: rule.format.clone(),
                }),
            },
        }
    }
}
