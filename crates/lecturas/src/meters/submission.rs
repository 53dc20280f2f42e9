use serde::{Deserialize, Serialize};

use super::claves::{ClaveCatalog, PLACEHOLDER_CLAVE_ID};
use super::domain::{Medidor, ReadingUpdateBt12, ReadingUpdateBt43};
use super::state::MeterState;
use crate::readings::{
    locale_decimal_to_number, parse_reading_date, reshape_date_for_backend, AnomalyResult,
    BlockReason, MeterSnapshot, ReadingAssessment, ReadingPipeline,
};

/// Reasons a reading update cannot be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("meter is {} and can no longer be modified", .0.label())]
    Locked(MeterState),
    #[error("{register} reading '{raw}' is not a number")]
    InvalidReading { register: Register, raw: String },
    #[error("{register} reading '{raw}' is negative")]
    NegativeReading { register: Register, raw: String },
    #[error("{register} reading '{raw}' exceeds the register maximum {max_value}")]
    DigitOverflow {
        register: Register,
        raw: String,
        max_value: i64,
    },
    #[error("{register} reading decreased on a {digit_count}-digit register without a rollover offset")]
    UnsupportedDigitWidth { register: Register, digit_count: u32 },
    #[error("a clave must be selected for the {0} reading")]
    MissingClave(Register),
    #[error("clave '{0}' is not in the catalog")]
    UnknownClave(String),
    #[error("{field} date '{value}' is not a valid date")]
    InvalidDate { field: &'static str, value: String },
}

/// Register a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    Active,
    Reactive,
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Register::Active => write!(f, "active"),
            Register::Reactive => write!(f, "reactive"),
        }
    }
}

/// BT-1/BT-2 form values as entered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bt12Form {
    pub vactual: String,
    pub claid: String,
}

/// BT-4.3 form values as entered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bt43Form {
    pub lectura_activa: String,
    pub clave_activa_id: String,
    pub lectura_reactiva: String,
    pub clave_reactiva_id: String,
    pub dp: String,
    pub dp_fecha: String,
    pub dp_hora: String,
    pub ds: String,
    pub ds_fecha: String,
    pub ds_hora: String,
}

/// A ready-to-send update plus the advisory anomalies found while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedUpdate<T> {
    pub update: T,
    pub anomalies: Vec<AnomalyResult>,
}

/// Builds backend update payloads once the reading pipeline accepts the form.
pub struct SubmissionBuilder<'a> {
    pipeline: &'a ReadingPipeline,
    catalog: &'a ClaveCatalog,
}

impl<'a> SubmissionBuilder<'a> {
    pub fn new(pipeline: &'a ReadingPipeline, catalog: &'a ClaveCatalog) -> Self {
        Self { pipeline, catalog }
    }

    pub fn bt12(
        &self,
        meter: &Medidor,
        state: Option<MeterState>,
        form: &Bt12Form,
    ) -> Result<PreparedUpdate<ReadingUpdateBt12>, SubmissionError> {
        ensure_editable(state)?;
        let clave = self.check_clave(&form.claid, Register::Active)?;

        let raw = form.vactual.trim();
        let assessment = self.accepted(&meter.snapshot(), raw, Register::Active)?;
        let consumption = assessment.consumption.consumption.clone();

        Ok(PreparedUpdate {
            update: ReadingUpdateBt12 {
                lmid: meter.reading_id.to_string(),
                vactual: raw.to_string(),
                consumo: consumption,
                claid: clave.to_string(),
            },
            anomalies: anomalies_of([&assessment]),
        })
    }

    pub fn bt43(
        &self,
        meter: &Medidor,
        state: Option<MeterState>,
        form: &Bt43Form,
    ) -> Result<PreparedUpdate<ReadingUpdateBt43>, SubmissionError> {
        ensure_editable(state)?;
        let active_clave = self.check_clave(&form.clave_activa_id, Register::Active)?;
        let reactive_clave = self.check_clave(&form.clave_reactiva_id, Register::Reactive)?;

        let active = self.accepted(
            &meter.snapshot(),
            form.lectura_activa.trim(),
            Register::Active,
        )?;
        let reactive = self.accepted(
            &meter.reactive_snapshot(),
            form.lectura_reactiva.trim(),
            Register::Reactive,
        )?;

        let (active_reading, active_consumption) = measured(&active);
        let (reactive_reading, reactive_consumption) = measured(&reactive);

        Ok(PreparedUpdate {
            update: ReadingUpdateBt43 {
                lm_id: meter.reading_id,
                lectura_activa: active_reading,
                clave_activa_id: active_clave.to_string(),
                lectura_reactiva: reactive_reading,
                clave_reactiva_id: reactive_clave.to_string(),
                consumo_activa: active_consumption,
                consumo_reactiva: reactive_consumption,
                dp: locale_decimal_to_number(&form.dp),
                dp_fecha: backend_date("dpFecha", &form.dp_fecha)?,
                dp_hora: form.dp_hora.trim().to_string(),
                ds: locale_decimal_to_number(&form.ds),
                ds_fecha: backend_date("dsFecha", &form.ds_fecha)?,
                ds_hora: form.ds_hora.trim().to_string(),
            },
            anomalies: anomalies_of([&active, &reactive]),
        })
    }

    fn check_clave<'c>(
        &self,
        id: &'c str,
        register: Register,
    ) -> Result<&'c str, SubmissionError> {
        let id = id.trim();
        if id.is_empty() || id == PLACEHOLDER_CLAVE_ID {
            return Err(SubmissionError::MissingClave(register));
        }
        if !self.catalog.is_empty() && self.catalog.find_by_id(id).is_none() {
            return Err(SubmissionError::UnknownClave(id.to_string()));
        }
        Ok(id)
    }

    fn accepted(
        &self,
        snapshot: &MeterSnapshot,
        raw: &str,
        register: Register,
    ) -> Result<ReadingAssessment, SubmissionError> {
        let assessment = self.pipeline.assess(snapshot, raw);
        let blocked_by = assessment.blocked_by;
        match blocked_by {
            None if assessment
                .result
                .measurement()
                .map_or(false, |measurement| measurement.current < 0) =>
            {
                Err(SubmissionError::NegativeReading {
                    register,
                    raw: raw.to_string(),
                })
            }
            None => Ok(assessment),
            Some(BlockReason::InvalidReading) => Err(SubmissionError::InvalidReading {
                register,
                raw: raw.to_string(),
            }),
            Some(BlockReason::DigitOverflow { max_value }) => {
                Err(SubmissionError::DigitOverflow {
                    register,
                    raw: raw.to_string(),
                    max_value,
                })
            }
            Some(BlockReason::UnsupportedDigitWidth { digit_count }) => {
                Err(SubmissionError::UnsupportedDigitWidth {
                    register,
                    digit_count,
                })
            }
        }
    }
}

/// Refuse meters whose reading is already invoiced or closed.
pub fn ensure_editable(state: Option<MeterState>) -> Result<(), SubmissionError> {
    match state {
        Some(state) if state.is_locked() => Err(SubmissionError::Locked(state)),
        _ => Ok(()),
    }
}

fn measured(assessment: &ReadingAssessment) -> (i64, f64) {
    assessment
        .result
        .measurement()
        .map(|measurement| (measurement.current, measurement.consumption))
        .unwrap_or_default()
}

fn anomalies_of<const N: usize>(assessments: [&ReadingAssessment; N]) -> Vec<AnomalyResult> {
    assessments
        .into_iter()
        .filter(|assessment| assessment.anomaly.is_anomalous)
        .map(|assessment| assessment.anomaly.clone())
        .collect()
}

/// Blank demand dates stay blank; anything else must be a real calendar date.
fn backend_date(field: &'static str, value: &str) -> Result<String, SubmissionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let date = parse_reading_date(trimmed).ok_or_else(|| SubmissionError::InvalidDate {
        field,
        value: value.to_string(),
    })?;
    Ok(reshape_date_for_backend(&date.format("%Y-%m-%d").to_string()))
}
