use serde::{Deserialize, Serialize};

use super::anomaly::{AnomalyDetector, AnomalyResult};
use super::consumption::{ConsumptionEngine, ConsumptionResult, ConsumptionView};
use super::digits::{max_value_for, validate_digits};
use super::normalize::detect_missing_decimal_separator;

/// The meter-side inputs of a reading check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    pub digit_count: u32,
    #[serde(default = "unit_multiplier")]
    pub multiplier: f64,
    pub previous_reading: i64,
    #[serde(default)]
    pub previous_consumption: f64,
}

fn unit_multiplier() -> f64 {
    1.0
}

/// Why a reading cannot be submitted as entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    InvalidReading,
    DigitOverflow { max_value: i64 },
    UnsupportedDigitWidth { digit_count: u32 },
}

/// Everything the reading form needs to render warnings or refuse a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingAssessment {
    pub raw_value: String,
    pub digits_valid: bool,
    pub max_value: i64,
    pub result: ConsumptionResult,
    pub consumption: ConsumptionView,
    pub anomaly: AnomalyResult,
    /// The entry looks like a value whose decimal separator was left out.
    pub missing_decimal_hint: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<BlockReason>,
    pub blocking: bool,
}

/// Digit check, consumption and anomaly detection run in sequence over one reading.
#[derive(Debug, Clone, Default)]
pub struct ReadingPipeline {
    engine: ConsumptionEngine,
    detector: AnomalyDetector,
}

impl ReadingPipeline {
    pub fn new(engine: ConsumptionEngine, detector: AnomalyDetector) -> Self {
        Self { engine, detector }
    }

    pub fn engine(&self) -> &ConsumptionEngine {
        &self.engine
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    pub fn assess(&self, snapshot: &MeterSnapshot, raw: &str) -> ReadingAssessment {
        let digits_valid = validate_digits(raw, snapshot.digit_count);
        let max_value = max_value_for(snapshot.digit_count);

        let result = self.engine.calculate(
            raw,
            snapshot.previous_reading,
            snapshot.digit_count,
            snapshot.multiplier,
        );

        // Anomalies are only judged on a usable figure.
        let anomaly = match result.measurement() {
            Some(measurement) => self.detector.detect_measurement(
                measurement,
                snapshot.previous_consumption,
                snapshot.digit_count,
                snapshot.multiplier,
            ),
            None => AnomalyResult::none(),
        };

        let blocked_by = match &result {
            ConsumptionResult::Invalid => Some(BlockReason::InvalidReading),
            _ if !digits_valid => Some(BlockReason::DigitOverflow { max_value }),
            ConsumptionResult::UnsupportedDigitWidth { digit_count, .. } => {
                Some(BlockReason::UnsupportedDigitWidth {
                    digit_count: *digit_count,
                })
            }
            ConsumptionResult::Measured(_) => None,
        };

        ReadingAssessment {
            raw_value: raw.to_string(),
            digits_valid,
            max_value,
            consumption: result.view(),
            result,
            anomaly,
            missing_decimal_hint: detect_missing_decimal_separator(raw),
            blocking: blocked_by.is_some(),
            blocked_by,
        }
    }
}
