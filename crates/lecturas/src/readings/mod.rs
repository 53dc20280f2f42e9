//! Reading validation, rollover-aware consumption and anomaly heuristics.
//!
//! Everything below the service layer is pure: no I/O, no shared state, and no failure
//! crosses the boundary as a panic or error. Invalid input comes back as data
//! ([`ConsumptionResult::Invalid`], `false`, [`AnomalyKind::None`]).

pub mod anomaly;
pub mod assessment;
pub mod consumption;
pub mod digits;
pub mod normalize;
pub mod rollover;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use anomaly::{detect_anomaly, AnomalyDetector, AnomalyKind, AnomalyPolicy, AnomalyResult};
pub use assessment::{BlockReason, MeterSnapshot, ReadingAssessment, ReadingPipeline};
pub use consumption::{
    calculate_consumption, Comparison, ComparisonKind, ConsumptionEngine, ConsumptionResult,
    ConsumptionView, Measurement,
};
pub use digits::{max_value_for, validate_digits};
pub use normalize::{
    detect_missing_decimal_separator, locale_decimal_to_number, parse_locale_decimal,
    parse_reading_date, reshape_date_for_backend, reshape_date_for_input, DecimalParseError,
};
pub use rollover::{rollover_offset, supported_digit_widths, UnsupportedWidthPolicy};
pub use router::readings_router;
pub use service::ReadingService;
