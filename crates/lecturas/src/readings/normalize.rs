//! Input normalizers applied to form values before they reach the engine.

use chrono::NaiveDate;

/// Errors from the strict decimal parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalParseError {
    #[error("decimal value is empty")]
    Empty,
    #[error("'{value}' is not a decimal number")]
    Invalid { value: String },
}

/// Parse a decimal that may use a comma separator, defaulting to `0` on any failure.
///
/// Like the reading forms, only the first comma is swapped and the longest numeric prefix
/// is used (`"1,5 kWh"` is `1.5`). Use [`parse_locale_decimal`] to tell zero apart from
/// unparseable text.
pub fn locale_decimal_to_number(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    leading_decimal(&text.replacen(',', ".", 1)).unwrap_or(0.0)
}

/// Strict sibling of [`locale_decimal_to_number`]: the whole text must be one number.
pub fn parse_locale_decimal(text: &str) -> Result<f64, DecimalParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DecimalParseError::Empty);
    }

    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| DecimalParseError::Invalid {
            value: text.to_string(),
        })
}

/// Whether a reading looks like it lost its decimal separator: three or more characters,
/// a value above 99 and neither `,` nor `.` present.
pub fn detect_missing_decimal_separator(text: &str) -> bool {
    if text.chars().count() < 3 || text.contains(',') || text.contains('.') {
        return false;
    }

    leading_decimal(text).map_or(false, |value| value > 99.0)
}

/// Reshape a backend date (`DD-MM-YYYY`, `DD/MM/YYYY` or ISO date-time) into the
/// `YYYY-MM-DD` form used by date inputs. Unrecognized text passes through.
pub fn reshape_date_for_input(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    if year_first(text).is_some() {
        return text.to_string();
    }

    if let Some([day, month, year]) = day_first(text, &[b'-', b'/']) {
        return format!("{year}-{month}-{day}");
    }

    if let Some((date, _)) = text.split_once('T') {
        return date.to_string();
    }

    text.to_string()
}

/// Reshape an input date (`YYYY-MM-DD`) into the backend's `DD-MM-YYYY`. Text already in
/// backend form, or unrecognized, passes through.
pub fn reshape_date_for_backend(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    if day_first(text, &[b'-']).is_some() {
        return text.to_string();
    }

    if let Some([year, month, day]) = year_first(text) {
        return format!("{day}-{month}-{year}");
    }

    text.to_string()
}

/// Calendar-checked date in any shape [`reshape_date_for_input`] understands.
pub fn parse_reading_date(text: &str) -> Option<NaiveDate> {
    let shaped = reshape_date_for_input(text.trim());
    year_first(&shaped)?;
    NaiveDate::parse_from_str(&shaped, "%Y-%m-%d").ok()
}

fn year_first(text: &str) -> Option<[&str; 3]> {
    digit_groups(text, [4, 2, 2], &[b'-'])
}

fn day_first<'a>(text: &'a str, separators: &[u8]) -> Option<[&'a str; 3]> {
    digit_groups(text, [2, 2, 4], separators)
}

/// Split `text` into three ASCII digit groups of the given widths joined by any of
/// `separators`.
fn digit_groups<'a>(
    text: &'a str,
    widths: [usize; 3],
    separators: &[u8],
) -> Option<[&'a str; 3]> {
    let bytes = text.as_bytes();
    if !text.is_ascii() || bytes.len() != widths.iter().sum::<usize>() + 2 {
        return None;
    }

    let mut groups = [""; 3];
    let mut start = 0;
    for (index, width) in widths.iter().enumerate() {
        let end = start + width;
        if !bytes[start..end].iter().all(u8::is_ascii_digit) {
            return None;
        }
        groups[index] = &text[start..end];
        if index < 2 {
            if !separators.contains(&bytes[end]) {
                return None;
            }
            start = end + 1;
        }
    }

    Some(groups)
}

/// Longest leading decimal literal (after leading whitespace), e.g. `"12.5abc"` is `12.5`.
fn leading_decimal(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
