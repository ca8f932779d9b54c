//! Duration helpers.
//!
//! Every display string in the service is derived from an integer count of
//! seconds. The YouTube Data API reports lengths as ISO-8601 durations
//! (`PT2H34M23S`), which are normalized here before formatting.

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_WEEK: u64 = 604_800;

/// Formats a number of seconds as space separated `h`/`m`/`s` tokens.
///
/// Units whose value is zero are left out, so `3600` becomes `"1h"` and
/// `61` becomes `"1m 1s"`. Zero itself is rendered as `"0s"`.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;

    let parts: Vec<String> = [(hours, 'h'), (minutes, 'm'), (seconds, 's')]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        return "0s".to_string();
    }

    parts.join(" ")
}

/// Parses an ISO-8601 duration as returned in `contentDetails.duration`.
///
/// Supports weeks and days before the `T` designator and hours, minutes and
/// seconds after it. Fractional seconds are truncated. Returns `None` when the
/// input is not a duration of that shape.
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.trim().strip_prefix('P')?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut total_seconds = 0u64;
    let mut seen_component = false;

    for (value, unit) in components(date_part)? {
        let multiplier = match unit {
            'W' => SECONDS_PER_WEEK,
            'D' => SECONDS_PER_DAY,
            _ => return None,
        };
        total_seconds = total_seconds.checked_add(whole_number(&value)?.checked_mul(multiplier)?)?;
        seen_component = true;
    }

    if let Some(time) = time_part {
        for (value, unit) in components(time)? {
            let amount = match unit {
                'H' => whole_number(&value)?.checked_mul(SECONDS_PER_HOUR)?,
                'M' => whole_number(&value)?.checked_mul(SECONDS_PER_MINUTE)?,
                'S' => {
                    let whole = value.split('.').next().unwrap_or_default();
                    whole_number(whole)?
                }
                _ => return None,
            };
            total_seconds = total_seconds.checked_add(amount)?;
            seen_component = true;
        }
    }

    seen_component.then_some(total_seconds)
}

/// Splits `2H34M` into `[("2", 'H'), ("34", 'M')]`.
fn components(section: &str) -> Option<Vec<(String, char)>> {
    let mut parsed = Vec::new();
    let mut current = String::new();

    for c in section.chars() {
        if c.is_ascii_digit() || c == '.' {
            current.push(c);
        } else {
            if current.is_empty() {
                return None;
            }
            parsed.push((std::mem::take(&mut current), c));
        }
    }

    // Trailing digits without a unit designator.
    if !current.is_empty() {
        return None;
    }

    Some(parsed)
}

fn whole_number(value: &str) -> Option<u64> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
