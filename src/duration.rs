use crate::error::InputError;
use itertools::Itertools;

/// Longest countdown a duration answer may ask for (24h).
pub const MAX_TIMER_DURATION_MS: u64 = 24 * 60 * 60 * 1000;
/// Longest extension; larger answers are clamped to this (8h).
pub const MAX_EXTEND_MINUTES: u32 = 8 * 60;
pub const DEFAULT_EXTEND_MINUTES: u32 = 5;

pub const MS_PER_MINUTE: u64 = 60_000;

// Ordered the way the alternation is tried: longer spellings first within
// each family so "hours" is consumed whole rather than as "h" + "ours".
const UNITS: [&str; 10] = [
    "hours", "hour", "hrs", "hr", "h", "minutes", "minute", "mins", "min", "m",
];

/// Parse a free-text duration answer into milliseconds.
///
/// Accepts clock form (`1:30`), unit-tagged quantities in any combination
/// (`1h 30m`, `1.5 hours`, `90 minutes`) and a bare number of minutes (`45`).
/// Anything that sums to zero, or exceeds [`MAX_TIMER_DURATION_MS`], is
/// rejected rather than clamped.
pub fn parse_duration(input: &str) -> Result<u64, InputError> {
    let raw = input.trim().to_lowercase();
    if raw.is_empty() {
        return Err(InputError::EmptyInput);
    }

    let total_minutes = if let Some(minutes) = parse_clock(&raw) {
        minutes as f64
    } else if let Some(minutes) = sum_unit_matches(&raw) {
        minutes
    } else if is_decimal(&raw) {
        raw.parse::<f64>()
            .map_err(|_| InputError::UnparseableDuration)?
    } else {
        0.0
    };

    if total_minutes <= 0.0 {
        return Err(InputError::UnparseableDuration);
    }

    let ms = (total_minutes * MS_PER_MINUTE as f64).round();
    if ms > MAX_TIMER_DURATION_MS as f64 {
        return Err(InputError::UnparseableDuration);
    }

    Ok(ms as u64)
}

/// Parse the extension field. Returns the minutes to add, clamped to
/// [`MAX_EXTEND_MINUTES`].
pub fn parse_extension_minutes(input: &str) -> Result<f64, InputError> {
    let minutes = input
        .trim()
        .parse::<f64>()
        .map_err(|_| InputError::InvalidExtension)?;

    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(InputError::InvalidExtension);
    }

    Ok(minutes.min(MAX_EXTEND_MINUTES as f64))
}

/// Convert (possibly fractional) minutes to whole milliseconds.
pub fn minutes_to_ms(minutes: f64) -> u64 {
    (minutes * MS_PER_MINUTE as f64).round().max(0.0) as u64
}

/// `HH:MM:SS` when at least an hour remains, `MM:SS` otherwise.
pub fn format_remaining(ms: u64) -> String {
    let total_seconds = (ms + 500) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Short summary like `1h 30m`, `2h` or `45m`. Empty for sub-half-minute values.
pub fn humanize_duration(ms: u64) -> String {
    let total_minutes = (ms + MS_PER_MINUTE / 2) / MS_PER_MINUTE;
    if total_minutes == 0 {
        return String::new();
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    let parts = [(hours, "h"), (minutes, "m")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, suffix)| format!("{}{}", value, suffix))
        .join(" ");

    if parts.is_empty() {
        format!("{}m", total_minutes)
    } else {
        parts
    }
}

fn parse_clock(raw: &str) -> Option<u32> {
    let (hours, minutes) = raw.split_once(':')?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return None;
    }

    Some(hours.parse::<u32>().ok()? * 60 + minutes.parse::<u32>().ok()?)
}

fn sum_unit_matches(raw: &str) -> Option<f64> {
    let chars: Vec<char> = raw.chars().collect();
    let mut total = 0.0;
    let mut matched = false;
    let mut pos = 0;

    while pos < chars.len() {
        match match_quantity_at(&chars, pos) {
            Some((minutes, end)) => {
                total += minutes;
                matched = true;
                pos = end;
            }
            None => pos += 1,
        }
    }

    matched.then_some(total)
}

/// Try `<number><spaces><unit>` at `start`, returning minutes and the index
/// just past the unit.
fn match_quantity_at(chars: &[char], start: usize) -> Option<(f64, usize)> {
    let int_end = digits_end(chars, start);
    if int_end == start {
        return None;
    }

    let mut number_ends = Vec::with_capacity(2);
    if chars.get(int_end) == Some(&'.') {
        let frac_end = digits_end(chars, int_end + 1);
        if frac_end > int_end + 1 {
            number_ends.push(frac_end);
        }
    }
    number_ends.push(int_end);

    for number_end in number_ends {
        let mut pos = number_end;
        while chars.get(pos).is_some_and(|c| c.is_whitespace()) {
            pos += 1;
        }

        if let Some(unit) = match_unit(chars, pos) {
            let quantity: f64 = chars[start..number_end]
                .iter()
                .collect::<String>()
                .parse()
                .ok()?;
            let minutes = if unit.starts_with('h') {
                quantity * 60.0
            } else {
                quantity
            };
            return Some((minutes, pos + unit.len()));
        }
    }

    None
}

fn match_unit(chars: &[char], pos: usize) -> Option<&'static str> {
    UNITS.iter().copied().find(|unit| {
        chars
            .get(pos..pos + unit.len())
            .is_some_and(|candidate| candidate.iter().copied().eq(unit.chars()))
    })
}

fn digits_end(chars: &[char], start: usize) -> usize {
    chars[start.min(chars.len())..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count()
        + start.min(chars.len())
}

fn is_decimal(raw: &str) -> bool {
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (raw, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    all_digits(int_part) && frac_part.map_or(true, all_digits)
}
