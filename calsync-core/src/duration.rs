//! Human-readable durations for rule windows ("1 week", "3 days, 4 hours").
//!
//! Accepted forms, in order of preference:
//! - a bare number of seconds (`"3600"`);
//! - one or more `<number> <unit>` pairs, separated by spaces, commas or
//!   "and", with the unit spelled out or abbreviated (`"1 week"`,
//!   `"1.5 hours"`, `"2d 6h"`, `"1 day and 30 minutes"`);
//! - anything `humantime` understands (`"1h30m"`, `"2weeks"`).

use chrono::TimeDelta;

use crate::error::{CalSyncError, CalSyncResult};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;

pub fn parse_duration(input: &str) -> CalSyncResult<TimeDelta> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty duration"));
    }

    let seconds = match parse_pairs(trimmed) {
        Ok(seconds) => seconds,
        Err(reason) => match humantime::parse_duration(trimmed) {
            Ok(std) => std.as_secs_f64(),
            Err(_) => return Err(invalid(input, &reason)),
        },
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid(input, "duration out of range"));
    }

    let millis = (seconds * 1000.0).round() as i64;
    TimeDelta::try_milliseconds(millis).ok_or_else(|| invalid(input, "duration out of range"))
}

fn parse_pairs(input: &str) -> Result<f64, String> {
    if let Ok(seconds) = input.parse::<f64>() {
        return Ok(seconds);
    }

    let tokens = tokenize(input);
    let mut total = 0.0;
    let mut i = 0;

    while i < tokens.len() {
        let (number, unit) = split_number(tokens[i]);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("expected a number, got \"{}\"", tokens[i]))?;

        let unit = if unit.is_empty() {
            i += 1;
            *tokens.get(i).ok_or_else(|| format!("missing unit after {}", number))?
        } else {
            unit
        };

        total += value * unit_seconds(unit).ok_or_else(|| format!("unknown unit \"{}\"", unit))?;
        i += 1;
    }

    Ok(total)
}

fn tokenize(input: &str) -> Vec<&str> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("and"))
        .collect()
}

/// Split "12weeks" into ("12", "weeks"); "12" into ("12", "").
fn split_number(token: &str) -> (&str, &str) {
    let end = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    token.split_at(end)
}

fn unit_seconds(unit: &str) -> Option<f64> {
    let seconds = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "wk" | "wks" | "week" | "weeks" => WEEK,
        _ => return None,
    };
    Some(seconds)
}

fn invalid(input: &str, reason: &str) -> CalSyncError {
    CalSyncError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_defaults() {
        assert_eq!(parse_duration("1 week").unwrap(), TimeDelta::weeks(1));
        assert_eq!(parse_duration("12 weeks").unwrap(), TimeDelta::weeks(12));
        assert_eq!(parse_duration("3 days").unwrap(), TimeDelta::days(3));
    }

    #[test]
    fn test_compound_and_abbreviated() {
        assert_eq!(
            parse_duration("1 day, 6 hours").unwrap(),
            TimeDelta::days(1) + TimeDelta::hours(6)
        );
        assert_eq!(
            parse_duration("2d 30m").unwrap(),
            TimeDelta::days(2) + TimeDelta::minutes(30)
        );
        assert_eq!(
            parse_duration("1 Hour and 15 Minutes").unwrap(),
            TimeDelta::minutes(75)
        );
        assert_eq!(parse_duration("1.5 hours").unwrap(), TimeDelta::minutes(90));
    }

    #[test]
    fn test_bare_seconds() {
        assert_eq!(parse_duration("3600").unwrap(), TimeDelta::hours(1));
    }

    #[test]
    fn test_humantime_fallback() {
        assert_eq!(parse_duration("1h30min").unwrap(), TimeDelta::minutes(90));
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "   ", "soon", "3 fortnights", "week", "-2 days"] {
            assert!(
                matches!(parse_duration(input), Err(CalSyncError::InvalidDuration { .. })),
                "{input:?} should be rejected"
            );
        }
    }
}
