/// Parse raw dial text the way the reading forms do: the whole text must be a finite
/// number, and the reading is its integer part (truncated, never rounded).
///
/// Returns `None` for blank input, non-numeric text, non-finite values and text without
/// leading integer digits (e.g. `".5"`). Integer parts beyond `i64` saturate.
pub(crate) fn parse_dial_reading(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.parse::<f64>().map_or(false, f64::is_finite) {
        return None;
    }

    let (sign, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (-1, &trimmed[1..]),
        b'+' => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if end == 0 {
        return None;
    }

    // A digit run too wide for i64 is still a number; saturate so the width check rejects it.
    match unsigned[..end].parse::<i64>() {
        Ok(magnitude) => Some(sign * magnitude),
        Err(_) if sign < 0 => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

/// Largest reading a register with `digit_count` wheels can show (`10^n - 1`).
///
/// Saturates at `i64::MAX` for widths beyond what an `i64` can hold.
pub fn max_value_for(digit_count: u32) -> i64 {
    10_i64
        .checked_pow(digit_count)
        .map(|limit| limit - 1)
        .unwrap_or(i64::MAX)
}

/// Bounds-check raw reading text against the meter's digit width.
///
/// Fails closed on blank or non-numeric text. Only the upper bound is enforced; a negative
/// reading that parses is accepted.
pub fn validate_digits(raw: &str, digit_count: u32) -> bool {
    match parse_dial_reading(raw) {
        Some(reading) => reading <= max_value_for(digit_count),
        None => false,
    }
}
