//! Text forms of date/time cells.
//!
//! Datetimes are written as ISO-8601 without an offset and durations as
//! ISO-8601 `P{d}DT{h}H{m}M{s}S`. Parsing is more lenient than formatting:
//! the grid hands back whatever the user typed.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const SECONDS_PER_DAY: i64 = 86_400;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Parses RFC 3339 (converted to UTC), naive ISO datetimes with `T` or a
/// space as separator, and plain dates.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_duration(value: &Duration) -> String {
    let secs = value.num_seconds();
    let nanos = value.subsec_nanos();
    let sign = if secs < 0 || nanos < 0 { "-" } else { "" };

    let secs = secs.unsigned_abs();
    let nanos = nanos.unsigned_abs();

    let days = secs / SECONDS_PER_DAY as u64;
    let hours = secs % SECONDS_PER_DAY as u64 / 3_600;
    let minutes = secs % 3_600 / 60;
    let seconds = secs % 60;

    let fraction = if nanos > 0 {
        let digits = format!("{:09}", nanos);
        format!(".{}", digits.trim_end_matches('0'))
    } else {
        String::new()
    };

    format!("{sign}P{days}DT{hours}H{minutes}M{seconds}{fraction}S")
}

/// Parses a duration from ISO-8601 (`P1DT2H`, `-PT30M`), the
/// `N days HH:MM:SS[.f]` text form, a bare clock (`02:03:04`) or a number
/// with a unit suffix (`5s`, `1.5 h`, `250ms`).
pub fn parse_duration(input: &str) -> Option<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let is_iso = |c: char| c == 'P' || c == 'p';
    if s.starts_with(is_iso) {
        return parse_iso_duration(s);
    }
    if let Some(rest) = s.strip_prefix('-') {
        if rest.starts_with(is_iso) {
            return parse_iso_duration(rest).map(|d| -d);
        }
    }

    parse_text_duration(s)
}

fn from_parts(secs: i64, nanos: i64) -> Option<Duration> {
    Duration::try_seconds(secs)?.checked_add(&Duration::nanoseconds(nanos))
}

/// Splits `12.5` into whole seconds and nanoseconds.
fn parse_seconds(text: &str) -> Option<(i64, i64)> {
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut digits: String = frac.chars().take(9).collect();
    while digits.len() < 9 {
        digits.push('0');
    }
    let nanos: i64 = digits.parse().ok()?;
    Some((whole, nanos))
}

fn parse_iso_duration(s: &str) -> Option<Duration> {
    let body = &s[1..];
    let mut secs: i64 = 0;
    let mut nanos: i64 = 0;
    let mut in_time = false;
    let mut any = false;
    let mut number = String::new();

    for c in body.chars() {
        match c.to_ascii_uppercase() {
            'T' if !in_time && number.is_empty() => in_time = true,
            d if d.is_ascii_digit() || d == '.' => number.push(d),
            unit => {
                if number.is_empty() {
                    return None;
                }
                let scale = match (in_time, unit) {
                    (false, 'W') => 7 * SECONDS_PER_DAY,
                    (false, 'D') => SECONDS_PER_DAY,
                    (true, 'H') => 3_600,
                    (true, 'M') => 60,
                    (true, 'S') => 1,
                    _ => return None,
                };
                if scale == 1 {
                    let (whole, frac) = parse_seconds(&number)?;
                    secs = secs.checked_add(whole)?;
                    nanos = frac;
                } else {
                    let value: i64 = number.parse().ok()?;
                    secs = secs.checked_add(value.checked_mul(scale)?)?;
                }
                number.clear();
                any = true;
            }
        }
    }

    if !any || !number.is_empty() {
        return None;
    }
    from_parts(secs, nanos)
}

fn parse_text_duration(s: &str) -> Option<Duration> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    match tokens.as_slice() {
        [days, unit] if unit.starts_with("day") => parse_days(days),
        [days, unit, clock] if unit.starts_with("day") => parse_days(days)?.checked_add(&parse_clock(clock)?),
        [clock] if clock.contains(':') => parse_clock(clock),
        [number, unit] => parse_unit(number, unit),
        [token] => {
            let pos = token.find(|c: char| c.is_alphabetic())?;
            parse_unit(&token[..pos], &token[pos..])
        }
        _ => None,
    }
}

fn parse_days(days: &str) -> Option<Duration> {
    let days: i64 = days.parse().ok()?;
    from_parts(days.checked_mul(SECONDS_PER_DAY)?, 0)
}

/// `[+-]HH:MM[:SS[.f]]`
fn parse_clock(clock: &str) -> Option<Duration> {
    let (negative, body) = match clock.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, clock.strip_prefix('+').unwrap_or(clock)),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if hours < 0 || !(0..60).contains(&minutes) {
        return None;
    }
    let (whole, nanos) = parse_seconds(seconds)?;
    if !(0..60).contains(&whole) {
        return None;
    }

    let secs = hours.checked_mul(3_600)?.checked_add(minutes * 60)?.checked_add(whole)?;
    let duration = from_parts(secs, nanos)?;
    Some(if negative { -duration } else { duration })
}

fn parse_unit(number: &str, unit: &str) -> Option<Duration> {
    let number: f64 = number.trim().parse().ok()?;
    if !number.is_finite() {
        return None;
    }

    let nanos_per_unit: f64 = match unit.trim().to_lowercase().as_str() {
        "ns" | "nanos" | "nanoseconds" => 1.0,
        "us" | "µs" | "micros" | "microseconds" => 1e3,
        "ms" | "millis" | "milliseconds" => 1e6,
        "s" | "sec" | "secs" | "second" | "seconds" => 1e9,
        "m" | "min" | "mins" | "minute" | "minutes" => 60e9,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600e9,
        "d" | "day" | "days" => 86_400e9,
        "w" | "week" | "weeks" => 604_800e9,
        _ => return None,
    };

    let nanos = (number * nanos_per_unit).round();
    if nanos.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::nanoseconds(nanos as i64))
}
