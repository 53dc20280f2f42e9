use serde::{Deserialize, Serialize};

use super::digits::parse_dial_reading;
use super::rollover::{rollover_offset, UnsupportedWidthPolicy};

/// How the new reading compares to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Decreased,
    Equal,
    Increased,
}

/// Flat comparison label used on the wire; `None` marks invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    Decreased,
    Equal,
    Increased,
    None,
}

impl From<Comparison> for ComparisonKind {
    fn from(value: Comparison) -> Self {
        match value {
            Comparison::Decreased => Self::Decreased,
            Comparison::Equal => Self::Equal,
            Comparison::Increased => Self::Increased,
        }
    }
}

/// A consumption figure derived from a valid reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub current: i64,
    pub previous: i64,
    pub comparison: Comparison,
    /// Reading after rollover compensation; equals `current` unless the dial wrapped.
    pub effective_reading: i64,
    pub consumption: f64,
}

impl Measurement {
    pub fn consumption_text(&self) -> String {
        format_decimal(self.consumption)
    }
}

/// Outcome of a consumption calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConsumptionResult {
    /// Blank or non-numeric reading text.
    Invalid,
    /// The reading decreased on a register width missing from the rollover table.
    UnsupportedDigitWidth {
        digit_count: u32,
        current: i64,
        previous: i64,
    },
    Measured(Measurement),
}

impl ConsumptionResult {
    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            ConsumptionResult::Measured(measurement) => Some(measurement),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ConsumptionResult::Invalid)
    }

    /// Flatten into the `{consumption, comparison_kind, effective_reading}` shape the forms
    /// consume. Only a measured result carries a consumption figure.
    pub fn view(&self) -> ConsumptionView {
        match self {
            ConsumptionResult::Invalid => ConsumptionView {
                consumption: String::new(),
                comparison_kind: ComparisonKind::None,
                effective_reading: 0,
            },
            ConsumptionResult::UnsupportedDigitWidth { current, .. } => ConsumptionView {
                consumption: String::new(),
                comparison_kind: ComparisonKind::Decreased,
                effective_reading: *current,
            },
            ConsumptionResult::Measured(measurement) => ConsumptionView {
                consumption: measurement.consumption_text(),
                comparison_kind: measurement.comparison.into(),
                effective_reading: measurement.effective_reading,
            },
        }
    }
}

/// Wire view of a [`ConsumptionResult`]. An empty `consumption` means no figure is usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionView {
    pub consumption: String,
    pub comparison_kind: ComparisonKind,
    pub effective_reading: i64,
}

/// Rollover-aware consumption calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsumptionEngine {
    unsupported_width: UnsupportedWidthPolicy,
}

impl ConsumptionEngine {
    pub fn new(unsupported_width: UnsupportedWidthPolicy) -> Self {
        Self { unsupported_width }
    }

    pub fn unsupported_width_policy(&self) -> UnsupportedWidthPolicy {
        self.unsupported_width
    }

    /// Derive billed consumption from raw dial text and the previous reading.
    pub fn calculate(
        &self,
        raw: &str,
        previous: i64,
        digit_count: u32,
        multiplier: f64,
    ) -> ConsumptionResult {
        let Some(current) = parse_dial_reading(raw) else {
            return ConsumptionResult::Invalid;
        };

        let (comparison, effective_reading) = if current < previous {
            let offset = match (rollover_offset(digit_count), self.unsupported_width) {
                (Some(offset), _) => offset,
                (None, UnsupportedWidthPolicy::NoOffset) => 0,
                (None, UnsupportedWidthPolicy::Reject) => {
                    return ConsumptionResult::UnsupportedDigitWidth {
                        digit_count,
                        current,
                        previous,
                    };
                }
            };
            (Comparison::Decreased, current.saturating_add(offset))
        } else if current == previous {
            (Comparison::Equal, current)
        } else {
            (Comparison::Increased, current)
        };

        let delta = effective_reading.saturating_sub(previous);

        ConsumptionResult::Measured(Measurement {
            current,
            previous,
            comparison,
            effective_reading,
            consumption: delta as f64 * multiplier,
        })
    }
}

/// Calculate with the default engine (unsupported widths rejected).
pub fn calculate_consumption(
    raw: &str,
    previous: i64,
    digit_count: u32,
    multiplier: f64,
) -> ConsumptionResult {
    ConsumptionEngine::default().calculate(raw, previous, digit_count, multiplier)
}

/// Shortest decimal text for a consumption figure: `100` rather than `100.0`, and no
/// negative zero.
pub(crate) fn format_decimal(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}
