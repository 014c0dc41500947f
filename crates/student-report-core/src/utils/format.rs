use chrono::{DateTime, NaiveDate};

/// Placeholder for absent or empty report values
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an optional string, returning "N/A" if absent or empty
pub fn value_or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format an optional integer, returning "N/A" if absent
pub fn int_or_na(value: Option<i64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Format a date as "January 2, 2006".
/// Accepts `YYYY-MM-DD` or RFC 3339; anything else is returned unchanged.
pub fn format_date(date: Option<&str>) -> String {
    let date = match date {
        Some(d) if !d.is_empty() => d,
        _ => return NOT_AVAILABLE.to_string(),
    };

    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%B %-d, %Y").to_string()
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.date_naive().format("%B %-d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Truncate a response body to at most `max_len` bytes, noting the original size
pub fn truncate_body(body: &str, max_len: usize) -> String {
    if body.len() <= max_len {
        return body.to_string();
    }
    let mut end = max_len;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}
