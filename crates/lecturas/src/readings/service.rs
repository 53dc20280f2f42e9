use tracing::{debug, warn};

use super::anomaly::{AnomalyDetector, AnomalyResult};
use super::assessment::{MeterSnapshot, ReadingAssessment, ReadingPipeline};
use super::consumption::{ConsumptionEngine, ConsumptionResult};
use super::digits::validate_digits;
use crate::config::ReadingsConfig;
use crate::meters::{
    Bt12Form, Bt43Form, ClaveCatalog, Medidor, MeterState, PreparedUpdate, ReadingUpdateBt12,
    ReadingUpdateBt43, SubmissionBuilder, SubmissionError,
};

/// Facade over the reading pipeline and clave catalog shared by the HTTP handlers and CLI.
#[derive(Debug, Clone, Default)]
pub struct ReadingService {
    pipeline: ReadingPipeline,
    catalog: ClaveCatalog,
}

impl ReadingService {
    pub fn new(pipeline: ReadingPipeline, catalog: ClaveCatalog) -> Self {
        Self { pipeline, catalog }
    }

    pub fn from_config(config: &ReadingsConfig, catalog: ClaveCatalog) -> Self {
        let pipeline = ReadingPipeline::new(
            ConsumptionEngine::new(config.unsupported_width),
            AnomalyDetector::new(config.anomaly.clone()),
        );
        Self::new(pipeline, catalog)
    }

    pub fn pipeline(&self) -> &ReadingPipeline {
        &self.pipeline
    }

    pub fn catalog(&self) -> &ClaveCatalog {
        &self.catalog
    }

    pub fn validate(&self, raw: &str, digit_count: u32) -> bool {
        validate_digits(raw, digit_count)
    }

    pub fn calculate(
        &self,
        raw: &str,
        previous: i64,
        digit_count: u32,
        multiplier: f64,
    ) -> ConsumptionResult {
        self.pipeline
            .engine()
            .calculate(raw, previous, digit_count, multiplier)
    }

    pub fn detect(
        &self,
        consumption_text: &str,
        previous_consumption: f64,
        digit_count: u32,
        multiplier: f64,
    ) -> AnomalyResult {
        self.pipeline.detector().detect(
            consumption_text,
            previous_consumption,
            digit_count,
            multiplier,
        )
    }

    pub fn assess(&self, snapshot: &MeterSnapshot, raw: &str) -> ReadingAssessment {
        let assessment = self.pipeline.assess(snapshot, raw);
        if let Some(reason) = &assessment.blocked_by {
            debug!(?reason, digit_count = snapshot.digit_count, "reading blocked");
        }
        if assessment.anomaly.is_anomalous {
            debug!(
                kind = ?assessment.anomaly.anomaly_kind,
                consumption = %assessment.consumption.consumption,
                "anomalous consumption"
            );
        }
        assessment
    }

    pub fn prepare_bt12(
        &self,
        meter: &Medidor,
        state: Option<MeterState>,
        form: &Bt12Form,
    ) -> Result<PreparedUpdate<ReadingUpdateBt12>, SubmissionError> {
        SubmissionBuilder::new(&self.pipeline, &self.catalog)
            .bt12(meter, state, form)
            .map_err(|err| {
                warn!(lm_id = meter.reading_id, %err, "bt-1/bt-2 update rejected");
                err
            })
    }

    pub fn prepare_bt43(
        &self,
        meter: &Medidor,
        state: Option<MeterState>,
        form: &Bt43Form,
    ) -> Result<PreparedUpdate<ReadingUpdateBt43>, SubmissionError> {
        SubmissionBuilder::new(&self.pipeline, &self.catalog)
            .bt43(meter, state, form)
            .map_err(|err| {
                warn!(lm_id = meter.reading_id, %err, "bt-4.3 update rejected");
                err
            })
    }
}
