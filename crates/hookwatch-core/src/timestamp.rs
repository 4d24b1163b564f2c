use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Output layout, e.g. `15 March 2024 - 02:30 PM UTC`.
const DISPLAY_FORMAT: &str = "%d %B %Y - %I:%M %p UTC";

// Seconds and fractions are optional wherever `%S` is absent from a pattern.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y%m%dT%H%M%S%.f%:z",
    "%Y%m%dT%H%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Format an ISO-8601 source timestamp for display.
///
/// The wall-clock time is rendered in the source's own offset and labelled
/// `UTC`; no conversion takes place. Input that does not parse is returned
/// unchanged.
pub fn format_timestamp(raw: &str) -> String {
    match parse_iso8601(raw) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => raw.to_owned(),
    }
}

/// Parse the subset of ISO-8601 that webhook sources emit, in extended
/// (`2024-03-15T14:30`) or basic (`20240315T1430`) form, with the time
/// truncated to hours, minutes or seconds. A trailing `Z` stands for
/// `+00:00`; offset-less values are taken as UTC.
pub fn parse_iso8601(raw: &str) -> Option<DateTime<FixedOffset>> {
    let zoned = match raw.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_owned(),
    };
    let input = expand_bare_hour(&zoned).unwrap_or(zoned);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&input) {
        return Some(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&input, fmt) {
            return Some(dt);
        }
    }

    let utc = FixedOffset::east_opt(0)?;
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&input, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&input, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    naive.and_local_timezone(utc).single()
}

/// Append zero minutes to an hour-only time (`…T14`, `…T14+02:00`) so the
/// minute-precision patterns accept it.
fn expand_bare_hour(input: &str) -> Option<String> {
    let sep = input.find(|c| c == 'T' || c == ' ')?;
    let (date, rest) = input.split_at(sep + 1);
    let hour = rest.get(..2)?;
    let tail = rest.get(2..)?;
    if !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !(tail.is_empty() || tail.starts_with(|c| c == '+' || c == '-')) {
        return None;
    }
    let minutes = if date.contains('-') { ":00" } else { "00" };
    Some(format!("{date}{hour}{minutes}{tail}"))
}
