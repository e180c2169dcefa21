//! Date recognition for the `date` and `date_format` rules.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Whether `text` reads as a calendar date in any of the common layouts.
pub(crate) fn is_date(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    DateTime::parse_from_rfc3339(text).is_ok()
        || DateTime::parse_from_rfc2822(text).is_ok()
        || DATE_TIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(text, f).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(text, f).is_ok())
}

/// Whether `text` matches a PHP-style format such as `Y-m-d` or `d/m/Y H:i`.
///
/// The parsed value must format back to exactly `text`, so unpadded fields
/// and surrounding whitespace are rejected where the format does not allow them.
pub(crate) fn matches_format(text: &str, php_format: &str) -> bool {
    let format = translate_php_format(php_format);
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, &format) {
        return formats_back(text, parsed.format(&format));
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, &format) {
        return formats_back(text, parsed.format(&format));
    }
    if let Ok(parsed) = NaiveTime::parse_from_str(text, &format) {
        return formats_back(text, parsed.format(&format));
    }
    false
}

fn formats_back(text: &str, formatted: impl std::fmt::Display) -> bool {
    let mut out = String::with_capacity(text.len());
    write!(out, "{formatted}").is_ok() && out == text
}

/// Translates PHP `date()` format characters into chrono `strftime` items.
///
/// Characters without a mapping are copied literally; `\` escapes the next
/// character as PHP does.
pub(crate) fn translate_php_format(php_format: &str) -> String {
    let mut out = String::with_capacity(php_format.len() * 2);
    let mut chars = php_format.chars();
    while let Some(c) = chars.next() {
        let item = match c {
            'd' => "%d",
            'j' => "%-d",
            'm' => "%m",
            'n' => "%-m",
            'Y' => "%Y",
            'y' => "%y",
            'H' => "%H",
            'G' => "%-H",
            'h' => "%I",
            'g' => "%-I",
            'i' => "%M",
            's' => "%S",
            'A' => "%p",
            'a' => "%P",
            'M' => "%b",
            'F' => "%B",
            'D' => "%a",
            'l' => "%A",
            '%' => "%%",
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut out, escaped);
                }
                continue;
            }
            other => {
                push_literal(&mut out, other);
                continue;
            }
        };
        out.push_str(item);
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
