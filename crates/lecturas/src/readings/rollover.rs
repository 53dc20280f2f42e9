use serde::{Deserialize, Serialize};

/// Offset added to a decreased reading, keyed by register width.
///
/// Single-digit registers carry a zero offset: their readings are taken as already wrapped.
const ROLLOVER_OFFSETS: &[(u32, i64)] = &[
    (1, 0),
    (4, 10_000),
    (5, 100_000),
    (6, 1_000_000),
    (7, 10_000_000),
    (8, 100_000_000),
    (10, 10_000_000_000),
];

/// Rollover offset for a register width, or `None` when the width has no table entry.
pub fn rollover_offset(digit_count: u32) -> Option<i64> {
    ROLLOVER_OFFSETS
        .iter()
        .find(|(width, _)| *width == digit_count)
        .map(|(_, offset)| *offset)
}

/// Register widths with a known rollover offset, in ascending order.
pub fn supported_digit_widths() -> impl Iterator<Item = u32> {
    ROLLOVER_OFFSETS.iter().map(|(width, _)| *width)
}

/// What to do when a reading decreased on a register width missing from the offset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedWidthPolicy {
    /// Report the width as unsupported instead of producing a consumption figure.
    #[default]
    Reject,
    /// Apply no offset, yielding a negative consumption (legacy behavior).
    NoOffset,
}

impl UnsupportedWidthPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "no_offset" | "no-offset" | "legacy" => Some(Self::NoOffset),
            _ => None,
        }
    }
}
