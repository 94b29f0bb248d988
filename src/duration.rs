//! Human-readable durations.
//!
//! [`parse_duration`] accepts several dialects and always yields seconds:
//!
//! | Input | Seconds |
//! |-------|---------|
//! | `1:30:00` | 5400 |
//! | `1:30` | 90 |
//! | `1 hr 30 min` | 5400 |
//! | `1h30m` | 5400 |
//! | `1.5 days` | 129600 |
//! | `120` | 120 |
//!
//! [`format_duration`] writes one canonical dialect (`1 hr 1 min 1 sec`)
//! that `parse_duration` reads back to the same whole number of seconds.

use std::sync::LazyLock;
use std::time::Duration;

use regex_lite::Regex;

use crate::error::DurationError;

struct Unit {
    name: &'static str,
    seconds: f64,
    pattern: Regex,
}

impl Unit {
    fn new(name: &'static str, seconds: f64, spellings: &str) -> Self {
        // The unit must not run into another letter, so "3 months" is not minutes.
        let pattern = Regex::new(&format!(r"(\d+(?:\.\d+)?)\s*(?:{spellings})(?:[^a-z]|$)"))
            .expect("unit pattern is valid");
        Self {
            name,
            seconds,
            pattern,
        }
    }
}

// Scanned in this order; longer spellings before their prefixes.
static UNITS: LazyLock<[Unit; 4]> = LazyLock::new(|| {
    [
        Unit::new("days", 86_400.0, "days|day|d"),
        Unit::new("hours", 3_600.0, "hours|hour|hrs|hr|h"),
        Unit::new("minutes", 60.0, "minutes|minute|mins|min|m"),
        Unit::new("seconds", 1.0, "seconds|second|secs|sec|s"),
    ]
});

/// Parse a duration string into seconds.
///
/// Empty or whitespace-only input is `0.0`. Any other input that matches no
/// dialect is an error rather than a silent zero.
pub fn parse_duration(text: &str) -> Result<f64, DurationError> {
    let input = text.trim().to_lowercase();
    if input.is_empty() {
        return Ok(0.0);
    }

    let total = if input.contains(':') {
        parse_clock(&input)?
    } else {
        match parse_units(&input)? {
            Some(total) => total,
            None => input
                .parse::<f64>()
                .map_err(|_| DurationError::Unparseable {
                    input: text.to_string(),
                })?,
        }
    };

    if !total.is_finite() || total < 0.0 {
        return Err(DurationError::OutOfRange {
            input: text.to_string(),
        });
    }
    Ok(total)
}

/// Like [`parse_duration`], as a [`std::time::Duration`].
pub fn parse_std_duration(text: &str) -> Result<Duration, DurationError> {
    let secs = parse_duration(text)?;
    Duration::try_from_secs_f64(secs).map_err(|_| DurationError::OutOfRange {
        input: text.to_string(),
    })
}

/// Format seconds as `"{h} hr {m} min {s} sec"`, omitting zero parts.
///
/// Seconds are always shown when hours and minutes are both zero, so the
/// output is never empty. With `compact`, each number touches its unit but
/// parts stay space-separated (`"1hr 1min 1sec"`). Fractions are truncated;
/// negative and NaN inputs format as `"0 sec"`.
pub fn format_duration(seconds: f64, compact: bool) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push((hours, "hr"));
    }
    if minutes > 0 {
        parts.push((minutes, "min"));
    }
    if secs > 0 || (hours == 0 && minutes == 0) {
        parts.push((secs, "sec"));
    }

    let gap = if compact { "" } else { " " };
    parts
        .iter()
        .map(|(n, unit)| format!("{n}{gap}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_clock(input: &str) -> Result<f64, DurationError> {
    let invalid = |reason: String| DurationError::InvalidClock {
        input: input.to_string(),
        reason,
    };

    let parts = input
        .split(':')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| invalid(format!("'{}': {e}", p.trim())))
        })
        .collect::<Result<Vec<f64>, _>>()
        .and_then(|parts| match parts.iter().find(|p| **p < 0.0) {
            Some(p) => Err(invalid(format!("negative part {p}"))),
            None => Ok(parts),
        });

    match input.split(':').count() {
        3 => {
            let p = parts?;
            Ok(p[0] * 3600.0 + p[1] * 60.0 + p[2])
        }
        2 => {
            let p = parts?;
            Ok(p[0] * 60.0 + p[1])
        }
        n => Err(invalid(format!(
            "wanted 2 or 3 parts separated by ':', got {n}"
        ))),
    }
}

/// Sum every unit found in `input`, or `None` if no unit matched.
fn parse_units(input: &str) -> Result<Option<f64>, DurationError> {
    let mut rest = input.to_string();
    let mut total = 0.0;
    let mut matched = false;

    for unit in UNITS.iter() {
        let Some(caps) = unit.pattern.captures(&rest) else {
            continue;
        };
        let number = caps.get(1).expect("group 1 always participates");
        let whole = caps.get(0).expect("group 0 always participates");
        let value: f64 = number
            .as_str()
            .parse()
            .map_err(|_| DurationError::Unparseable {
                input: input.to_string(),
            })?;
        total += value * unit.seconds;
        matched = true;

        // Cut the number and unit but keep any separator the pattern consumed.
        let consumed_tail = whole
            .as_str()
            .chars()
            .last()
            .filter(|c| !c.is_ascii_alphabetic())
            .map(char::len_utf8)
            .unwrap_or(0);
        let cut = number.start()..whole.end() - consumed_tail;
        rest.replace_range(cut, " ");

        if unit.pattern.is_match(&rest) {
            return Err(DurationError::Ambiguous {
                input: input.to_string(),
                unit: unit.name,
            });
        }
    }

    Ok(matched.then_some(total))
}
