use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::anomaly::AnomalyResult;
use super::assessment::{MeterSnapshot, ReadingAssessment};
use super::consumption::ConsumptionResult;
use super::digits::max_value_for;
use super::normalize::{
    detect_missing_decimal_separator, locale_decimal_to_number, reshape_date_for_backend,
    reshape_date_for_input,
};
use super::service::ReadingService;
use crate::error::AppError;
use crate::meters::{
    Bt12Form, Bt43Form, ClaveOption, Medidor, MeterState, PreparedUpdate, ReadingUpdateBt12,
    ReadingUpdateBt43,
};

/// Router exposing the reading checks for server-side re-validation.
pub fn readings_router(service: Arc<ReadingService>) -> Router {
    Router::new()
        .route("/api/v1/readings/validate", post(validate_handler))
        .route("/api/v1/readings/consumption", post(consumption_handler))
        .route("/api/v1/readings/anomaly", post(anomaly_handler))
        .route("/api/v1/readings/assess", post(assess_handler))
        .route("/api/v1/readings/bt12", post(bt12_handler))
        .route("/api/v1/readings/bt43", post(bt43_handler))
        .route("/api/v1/normalize/decimal", post(decimal_handler))
        .route("/api/v1/normalize/date", post(date_handler))
        .route("/api/v1/claves", get(claves_handler))
        .route("/api/v1/claves/correct", get(correct_clave_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub raw_value: String,
    pub digit_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub max_value: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConsumptionRequest {
    pub raw_value: String,
    pub previous_value: i64,
    pub digit_count: u32,
    #[serde(default = "unit_multiplier")]
    pub multiplier: f64,
}

#[derive(Debug, Deserialize)]
pub struct AnomalyRequest {
    pub consumption: String,
    #[serde(default)]
    pub previous_consumption: f64,
    pub digit_count: u32,
    #[serde(default = "unit_multiplier")]
    pub multiplier: f64,
}

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub raw_value: String,
    #[serde(flatten)]
    pub snapshot: MeterSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct Bt12Request {
    pub meter: Medidor,
    /// Clave markup from the sector listing, used to refuse locked meters.
    #[serde(default)]
    pub clave_html: Option<String>,
    #[serde(flatten)]
    pub form: Bt12Form,
}

#[derive(Debug, Deserialize)]
pub struct Bt43Request {
    pub meter: Medidor,
    #[serde(default)]
    pub clave_html: Option<String>,
    #[serde(flatten)]
    pub form: Bt43Form,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecimalResponse {
    pub value: f64,
    pub missing_separator: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DateResponse {
    pub input: String,
    pub backend: String,
}

#[derive(Debug, Deserialize)]
pub struct ClavesQuery {
    #[serde(default)]
    pub group: String,
}

fn unit_multiplier() -> f64 {
    1.0
}

fn state_from(clave_html: Option<&str>) -> Option<MeterState> {
    clave_html.and_then(MeterState::from_clave_html)
}

pub(crate) async fn validate_handler(
    State(service): State<Arc<ReadingService>>,
    Json(request): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        valid: service.validate(&request.raw_value, request.digit_count),
        max_value: max_value_for(request.digit_count),
    })
}

pub(crate) async fn consumption_handler(
    State(service): State<Arc<ReadingService>>,
    Json(request): Json<ConsumptionRequest>,
) -> Response {
    let result = service.calculate(
        &request.raw_value,
        request.previous_value,
        request.digit_count,
        request.multiplier,
    );

    match result {
        ConsumptionResult::UnsupportedDigitWidth { digit_count, .. } => {
            debug!(digit_count, "consumption refused for unsupported register width");
            let payload = json!({
                "error": format!(
                    "reading decreased on a {digit_count}-digit register without a rollover offset"
                ),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        other => (StatusCode::OK, Json(other.view())).into_response(),
    }
}

pub(crate) async fn anomaly_handler(
    State(service): State<Arc<ReadingService>>,
    Json(request): Json<AnomalyRequest>,
) -> Json<AnomalyResult> {
    Json(service.detect(
        &request.consumption,
        request.previous_consumption,
        request.digit_count,
        request.multiplier,
    ))
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<ReadingService>>,
    Json(request): Json<AssessRequest>,
) -> Json<ReadingAssessment> {
    Json(service.assess(&request.snapshot, &request.raw_value))
}

pub(crate) async fn bt12_handler(
    State(service): State<Arc<ReadingService>>,
    Json(request): Json<Bt12Request>,
) -> Result<Json<PreparedUpdate<ReadingUpdateBt12>>, AppError> {
    let state = state_from(request.clave_html.as_deref());
    let prepared = service.prepare_bt12(&request.meter, state, &request.form)?;
    Ok(Json(prepared))
}

pub(crate) async fn bt43_handler(
    State(service): State<Arc<ReadingService>>,
    Json(request): Json<Bt43Request>,
) -> Result<Json<PreparedUpdate<ReadingUpdateBt43>>, AppError> {
    let state = state_from(request.clave_html.as_deref());
    let prepared = service.prepare_bt43(&request.meter, state, &request.form)?;
    Ok(Json(prepared))
}

pub(crate) async fn decimal_handler(
    Json(request): Json<NormalizeRequest>,
) -> Json<DecimalResponse> {
    Json(DecimalResponse {
        value: locale_decimal_to_number(&request.value),
        missing_separator: detect_missing_decimal_separator(&request.value),
    })
}

pub(crate) async fn date_handler(Json(request): Json<NormalizeRequest>) -> Json<DateResponse> {
    Json(DateResponse {
        input: reshape_date_for_input(&request.value),
        backend: reshape_date_for_backend(&request.value),
    })
}

pub(crate) async fn claves_handler(
    State(service): State<Arc<ReadingService>>,
    Query(query): Query<ClavesQuery>,
) -> Json<Vec<ClaveOption>> {
    Json(service.catalog().options_for_group(&query.group))
}

pub(crate) async fn correct_clave_handler(
    State(service): State<Arc<ReadingService>>,
) -> Json<serde_json::Value> {
    Json(json!({ "id": service.catalog().correct_reading_id() }))
}
