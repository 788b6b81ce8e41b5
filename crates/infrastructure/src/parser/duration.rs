//! Duration strings such as `30s`, `1m30s` or `250ms`.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

#[allow(clippy::expect_used)]
static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)?(?:ns|us|µs|ms|s|m|h))+$").expect("valid duration pattern")
});

#[allow(clippy::expect_used)]
static COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<value>\d+(?:\.\d+)?)(?P<unit>ns|us|µs|ms|s|m|h)").expect("valid component pattern")
});

/// A duration string that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid duration '{0}': expected a sequence like 30s, 1m30s or 500ms")]
pub struct DurationError(pub String);

/// Units accepted in a duration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    fn parse(unit: &str) -> Option<Self> {
        match unit {
            "ns" => Some(Self::Nanosecond),
            "us" | "µs" => Some(Self::Microsecond),
            "ms" => Some(Self::Millisecond),
            "s" => Some(Self::Second),
            "m" => Some(Self::Minute),
            "h" => Some(Self::Hour),
            _ => None,
        }
    }

    const fn nanos(self) -> f64 {
        match self {
            Self::Nanosecond => 1.0,
            Self::Microsecond => 1e3,
            Self::Millisecond => 1e6,
            Self::Second => 1e9,
            Self::Minute => 60e9,
            Self::Hour => 3600e9,
        }
    }
}

/// Parses a duration made of one or more `<number><unit>` components.
///
/// A bare `0` is accepted; any other number needs a unit.
///
/// # Errors
///
/// Returns [`DurationError`] if the string is not a valid duration.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let text = text.trim();
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if !DURATION_REGEX.is_match(text) {
        return Err(DurationError(text.to_string()));
    }

    let mut nanos = 0.0_f64;
    for caps in COMPONENT_REGEX.captures_iter(text) {
        let value: f64 = caps["value"]
            .parse()
            .map_err(|_| DurationError(text.to_string()))?;
        let unit = TimeUnit::parse(&caps["unit"]).ok_or_else(|| DurationError(text.to_string()))?;
        nanos += value * unit.nanos();
    }

    Duration::try_from_secs_f64(nanos / 1e9).map_err(|_| DurationError(text.to_string()))
}
