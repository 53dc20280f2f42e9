use serde::{Deserialize, Serialize};

use super::consumption::Measurement;

pub const TRUNCATED_DECIMAL_MESSAGE: &str = "⚠️ El consumo calculado contiene muchos \"9s\" consecutivos. Esto puede indicar un error en los decimales de la lectura importada.";
pub const INCORRECT_ROLLOVER_MESSAGE: &str = "⚠️ El consumo calculado es anormalmente alto. Verifique que los valores de lectura anterior y actual sean correctos.";
pub const EXCESSIVE_MESSAGE: &str = "⚠️ El consumo calculado es significativamente mayor al histórico. Verifique los valores ingresados.";

const TRUNCATED_DECIMAL_MIN_NINES: usize = 4;
const TRUNCATED_DECIMAL_MIN_LEN: usize = 5;

/// Heuristic fault patterns. After `None`, variants run from highest to lowest reporting
/// priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    None,
    TruncatedDecimal,
    IncorrectRollover,
    Excessive,
}

impl AnomalyKind {
    pub fn message(self) -> &'static str {
        match self {
            AnomalyKind::None => "",
            AnomalyKind::TruncatedDecimal => TRUNCATED_DECIMAL_MESSAGE,
            AnomalyKind::IncorrectRollover => INCORRECT_ROLLOVER_MESSAGE,
            AnomalyKind::Excessive => EXCESSIVE_MESSAGE,
        }
    }

    /// Code used by the legacy reading forms.
    pub fn legacy_code(self) -> &'static str {
        match self {
            AnomalyKind::None => "",
            AnomalyKind::TruncatedDecimal => "decimal_truncado",
            AnomalyKind::IncorrectRollover => "rollover_incorrecto",
            AnomalyKind::Excessive => "excesivo",
        }
    }
}

/// Thresholds for the rollover and history heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPolicy {
    /// Share of the register's full range above which a consumption looks like a bad rollover.
    pub rollover_ratio: f64,
    /// Multiple of the previous consumption tolerated before flagging.
    pub history_factor: f64,
    /// Lowest excessive-consumption threshold regardless of history.
    pub floor: f64,
    /// Stand-in for the previous consumption when there is no positive history.
    pub fallback_base: f64,
}

impl Default for AnomalyPolicy {
    fn default() -> Self {
        Self {
            rollover_ratio: 0.8,
            history_factor: 3.0,
            floor: 2000.0,
            fallback_base: 500.0,
        }
    }
}

impl AnomalyPolicy {
    pub fn rollover_ceiling(&self, digit_count: u32, multiplier: f64) -> f64 {
        self.rollover_ratio * 10_f64.powf(f64::from(digit_count)) * multiplier
    }

    pub fn excessive_threshold(&self, previous_consumption: f64) -> f64 {
        let base = if previous_consumption > 0.0 {
            previous_consumption
        } else {
            self.fallback_base
        };
        (base * self.history_factor).max(self.floor)
    }
}

/// Advisory verdict on a computed consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub is_anomalous: bool,
    /// Highest-priority heuristic that fired.
    pub anomaly_kind: AnomalyKind,
    pub message: String,
    /// Every heuristic that fired, in priority order.
    #[serde(default)]
    pub fired: Vec<AnomalyKind>,
}

impl AnomalyResult {
    pub fn none() -> Self {
        Self {
            is_anomalous: false,
            anomaly_kind: AnomalyKind::None,
            message: String::new(),
            fired: Vec::new(),
        }
    }

    fn from_fired(fired: Vec<AnomalyKind>) -> Self {
        let kind = fired.first().copied().unwrap_or(AnomalyKind::None);
        Self {
            is_anomalous: !fired.is_empty(),
            anomaly_kind: kind,
            message: kind.message().to_string(),
            fired,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    policy: AnomalyPolicy,
}

impl AnomalyDetector {
    pub fn new(policy: AnomalyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AnomalyPolicy {
        &self.policy
    }

    /// Inspect consumption text. Blank or non-numeric text is never judged anomalous.
    pub fn detect(
        &self,
        consumption_text: &str,
        previous_consumption: f64,
        digit_count: u32,
        multiplier: f64,
    ) -> AnomalyResult {
        let Some(consumption) = consumption_text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
        else {
            return AnomalyResult::none();
        };

        let mut fired = Vec::new();

        let nines = consumption_text.matches('9').count();
        if nines >= TRUNCATED_DECIMAL_MIN_NINES
            && consumption_text.chars().count() >= TRUNCATED_DECIMAL_MIN_LEN
        {
            fired.push(AnomalyKind::TruncatedDecimal);
        }

        if consumption > self.policy.rollover_ceiling(digit_count, multiplier) {
            fired.push(AnomalyKind::IncorrectRollover);
        }

        if consumption > self.policy.excessive_threshold(previous_consumption) {
            fired.push(AnomalyKind::Excessive);
        }

        AnomalyResult::from_fired(fired)
    }

    pub fn detect_measurement(
        &self,
        measurement: &Measurement,
        previous_consumption: f64,
        digit_count: u32,
        multiplier: f64,
    ) -> AnomalyResult {
        self.detect(
            &measurement.consumption_text(),
            previous_consumption,
            digit_count,
            multiplier,
        )
    }
}

/// Detect with the default thresholds.
pub fn detect_anomaly(
    consumption_text: &str,
    previous_consumption: f64,
    digit_count: u32,
    multiplier: f64,
) -> AnomalyResult {
    AnomalyDetector::default().detect(consumption_text, previous_consumption, digit_count, multiplier)
}
