use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    CalculatorModel, CalculatorSession, CapacityCalculator, CapacityField, FinancingCalculator,
    FinancingField, MetricsDisplay, ReportFor, SliderAction,
};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub capacity: CapacityCalculator,
    pub financing: FinancingCalculator,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Change request must include one of value, action or entry")]
    MissingChange,
    #[error("Change request must include only one of value, action or entry")]
    AmbiguousChange,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self, "rejected calculator request");
        error_response(StatusCode::BAD_REQUEST, &self.to_string())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiSliderAction {
    Increase,
    Decrease,
    #[serde(alias = "increaseCoarse", alias = "increase_coarse")]
    IncreaseCoarse,
    #[serde(alias = "decreaseCoarse", alias = "decrease_coarse")]
    DecreaseCoarse,
}

impl From<ApiSliderAction> for SliderAction {
    fn from(value: ApiSliderAction) -> Self {
        match value {
            ApiSliderAction::Increase => SliderAction::Increase,
            ApiSliderAction::Decrease => SliderAction::Decrease,
            ApiSliderAction::IncreaseCoarse => SliderAction::IncreaseCoarse,
            ApiSliderAction::DecreaseCoarse => SliderAction::DecreaseCoarse,
        }
    }
}

/// Partial input set from a request; absent fields keep their defaults.
trait InputPayload {
    type Model: CalculatorModel;

    fn overrides(&self) -> Vec<(<Self::Model as CalculatorModel>::Field, f64)>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CapacityPayload {
    unit_count: Option<f64>,
    hours_per_day: Option<f64>,
    utilization_percent: Option<f64>,
    unit_price: Option<f64>,
    operating_days_per_year: Option<f64>,
    other_annual_costs: Option<f64>,
}

impl InputPayload for CapacityPayload {
    type Model = CapacityCalculator;

    fn overrides(&self) -> Vec<(CapacityField, f64)> {
        [
            (CapacityField::UnitCount, self.unit_count),
            (CapacityField::HoursPerDay, self.hours_per_day),
            (CapacityField::UtilizationPercent, self.utilization_percent),
            (CapacityField::UnitPrice, self.unit_price),
            (
                CapacityField::OperatingDaysPerYear,
                self.operating_days_per_year,
            ),
            (CapacityField::OtherAnnualCosts, self.other_annual_costs),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FinancingPayload {
    monthly_revenue: Option<f64>,
    supplier_spend: Option<f64>,
    early_pay_discount_percent: Option<f64>,
    discount_window_days: Option<f64>,
    standard_terms_days: Option<f64>,
    repay_day: Option<f64>,
}

impl InputPayload for FinancingPayload {
    type Model = FinancingCalculator;

    fn overrides(&self) -> Vec<(FinancingField, f64)> {
        [
            (FinancingField::MonthlyRevenue, self.monthly_revenue),
            (FinancingField::SupplierSpend, self.supplier_spend),
            (
                FinancingField::EarlyPayDiscountPercent,
                self.early_pay_discount_percent,
            ),
            (FinancingField::DiscountWindowDays, self.discount_window_days),
            (FinancingField::StandardTermsDays, self.standard_terms_days),
            (FinancingField::RepayDay, self.repay_day),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePayload<P> {
    #[serde(flatten)]
    inputs: P,
    field: String,
    value: Option<f64>,
    action: Option<ApiSliderAction>,
    entry: Option<String>,
}

impl<P> ChangePayload<P> {
    fn slider_action(&self) -> Result<SliderAction, ApiError> {
        match (self.value, self.action, self.entry.as_ref()) {
            (Some(value), None, None) => Ok(SliderAction::Set(value)),
            (None, Some(action), None) => Ok(action.into()),
            (None, None, Some(text)) => Ok(SliderAction::Entry(text.clone())),
            (None, None, None) => Err(ApiError::MissingChange),
            _ => Err(ApiError::AmbiguousChange),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/calculators/capacity",
            get(capacity_get_handler).post(capacity_post_handler),
        )
        .route(
            "/api/calculators/capacity/change",
            post(capacity_change_handler),
        )
        .route(
            "/api/calculators/financing",
            get(financing_get_handler).post(financing_post_handler),
        )
        .route(
            "/api/calculators/financing/change",
            post(financing_change_handler),
        )
        .fallback(not_found_handler)
        .with_state(Arc::new(state))
}

pub async fn run_http_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "calculator HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn capacity_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<CapacityPayload>,
) -> Response {
    json_response(StatusCode::OK, evaluate(&state.capacity, &payload))
}

async fn capacity_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CapacityPayload>,
) -> Response {
    json_response(StatusCode::OK, evaluate(&state.capacity, &payload))
}

async fn capacity_change_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChangePayload<CapacityPayload>>,
) -> Result<Response, ApiError> {
    let report = apply_change_request(&state.capacity, &payload)?;
    Ok(json_response(StatusCode::OK, report))
}

async fn financing_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<FinancingPayload>,
) -> Response {
    json_response(StatusCode::OK, evaluate(&state.financing, &payload))
}

async fn financing_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FinancingPayload>,
) -> Response {
    json_response(StatusCode::OK, evaluate(&state.financing, &payload))
}

async fn financing_change_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChangePayload<FinancingPayload>>,
) -> Result<Response, ApiError> {
    let report = apply_change_request(&state.financing, &payload)?;
    Ok(json_response(StatusCode::OK, report))
}

fn inputs_from_payload<P: InputPayload>(payload: &P) -> <P::Model as CalculatorModel>::Inputs {
    let mut inputs = <P::Model as CalculatorModel>::Inputs::default();
    // Integer fields cannot hold NaN, so non-finite values keep the default.
    for (field, value) in payload.overrides() {
        if value.is_finite() {
            P::Model::set_value(&mut inputs, field, value);
        }
    }
    inputs
}

fn evaluate<P>(model: &P::Model, payload: &P) -> ReportFor<P::Model>
where
    P: InputPayload,
    <P::Model as CalculatorModel>::Metrics: MetricsDisplay,
{
    CalculatorSession::with_inputs(model, inputs_from_payload(payload)).report()
}

fn apply_change_request<P>(
    model: &P::Model,
    payload: &ChangePayload<P>,
) -> Result<ReportFor<P::Model>, ApiError>
where
    P: InputPayload,
    <P::Model as CalculatorModel>::Metrics: MetricsDisplay,
{
    let field = model
        .field_by_key(&payload.field)
        .ok_or_else(|| ApiError::UnknownField(payload.field.clone()))?;
    let action = payload.slider_action()?;

    let mut session = CalculatorSession::with_inputs(model, inputs_from_payload(&payload.inputs));
    session.act(field, &action);
    Ok(session.report())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
