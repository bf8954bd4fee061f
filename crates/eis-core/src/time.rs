//! Lightweight UTC timestamp utilities (no chrono dependency).
//!
//! Uses Howard Hinnant's days_from_civil / civil_from_days algorithms.
//! Timestamps without an explicit offset are read as UTC.

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parse an ISO-8601 date (`2024-01-01`) or date-time
/// (`2024-01-01T12:30:00.250Z`, `2024-01-01 12:30`, `...+02:00`) into Unix
/// milliseconds. Returns None for anything else.
pub fn parse_iso8601_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    let (date, time) = match s.find(['T', ' ']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    if !date.is_ascii()
        || date.len() != 10
        || date.as_bytes()[4] != b'-'
        || date.as_bytes()[7] != b'-'
    {
        return None;
    }
    let year = digits(&date[0..4])? as i64;
    let month = digits(&date[5..7])?;
    let day = digits(&date[8..10])?;
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return None;
    }

    let mut millis = days_from_civil(year, month, day) * MILLIS_PER_DAY;
    if let Some(time) = time {
        millis += parse_time_of_day(time)?;
    }
    Some(millis)
}

/// Milliseconds since midnight, shifted to UTC by any trailing offset.
fn parse_time_of_day(s: &str) -> Option<i64> {
    let (clock, offset_minutes) = if let Some(clock) = s.strip_suffix('Z') {
        (clock, 0)
    } else if let Some(i) = s.rfind(['+', '-']) {
        let sign = if s.as_bytes()[i] == b'-' { -1 } else { 1 };
        let offset = s[i + 1..].replace(':', "");
        if !offset.is_ascii() || offset.len() != 4 {
            return None;
        }
        let hours = digits(&offset[0..2])? as i64;
        let minutes = digits(&offset[2..4])? as i64;
        (&s[..i], sign * (hours * 60 + minutes))
    } else {
        (s, 0)
    };

    let (hms, fraction) = match clock.split_once('.') {
        Some((hms, frac)) => (hms, Some(frac)),
        None => (clock, None),
    };
    let mut parts = hms.split(':');
    let hours = digits(parts.next()?)? as i64;
    let minutes = digits(parts.next()?)? as i64;
    let seconds = match parts.next() {
        Some(sec) => digits(sec)? as i64,
        None => 0,
    };
    if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 60 {
        return None;
    }

    let millis = match fraction {
        Some(frac) if !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()) => {
            let padded = format!("{:0<3}", &frac[..frac.len().min(3)]);
            digits(&padded)? as i64
        }
        Some(_) => return None,
        None => 0,
    };

    Some(((hours * 60 + minutes - offset_minutes) * 60 + seconds) * 1000 + millis)
}

/// Parse a non-empty run of ASCII digits.
fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn is_leap(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Howard Hinnant's days_from_civil: (year, month, day) → Unix epoch days.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u64;
    let mp = ((month + 9) % 12) as u64;
    let doy = (153 * mp + 2) / 5 + day as u64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe as i64 - 719468
}

/// Convert Unix milliseconds to an ISO-8601 UTC string (second precision).
pub fn millis_to_iso8601(millis: i64) -> String {
    let days = millis.div_euclid(MILLIS_PER_DAY);
    let time_of_day = millis.rem_euclid(MILLIS_PER_DAY) / 1000;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (y, m, d) = civil_from_days(days);
    format!("{y:04}-{m:02}-{d:02}T{hours:02}:{minutes:02}:{seconds:02}Z")
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u64, u64) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}
