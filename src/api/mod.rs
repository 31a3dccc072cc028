use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    CoverageBreakdown, CoverageParams, Field, RawInput, compute, update_field,
};
use crate::lead::{
    LeadForm, LeadSubmitter, QuotePayload, SubmitError, SubmitOutcome, SubmitState,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub webhook_url: String,
    pub fee_rate: f64,
    pub mask_submit_failures: bool,
}

#[derive(Clone)]
struct ApiState {
    fee_rate: f64,
    submitter: Arc<LeadSubmitter>,
}

/// One raw field edit as it arrives over the wire. Query strings always
/// deserialize into `Text`; JSON bodies may carry either form.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    fn as_input(&self) -> RawInput<'_> {
        match self {
            RawField::Number(v) => RawInput::Number(*v),
            RawField::Text(s) => RawInput::Text(s),
        }
    }
}

/// Partial parameter set; absent fields keep their defaults. Every provided
/// value goes through the same `update_field` policy the interactive
/// controller uses, so the API cannot bypass field validation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QuoteRequest {
    monthly_expenses: Option<RawField>,
    years_to_cover: Option<RawField>,
    housing_loan: Option<RawField>,
    car_loan: Option<RawField>,
    credit_card_debt: Option<RawField>,
    personal_loans: Option<RawField>,
    estimated_property_value: Option<RawField>,
    total_asset_value: Option<RawField>,
    children_education: Option<RawField>,
    emergency_fund: Option<RawField>,
    funeral_expenses: Option<RawField>,
}

impl QuoteRequest {
    fn fields(&self) -> [(Field, &Option<RawField>); 11] {
        [
            (Field::MonthlyExpenses, &self.monthly_expenses),
            (Field::YearsToCover, &self.years_to_cover),
            (Field::HousingLoan, &self.housing_loan),
            (Field::CarLoan, &self.car_loan),
            (Field::CreditCardDebt, &self.credit_card_debt),
            (Field::PersonalLoans, &self.personal_loans),
            (Field::EstimatedPropertyValue, &self.estimated_property_value),
            (Field::TotalAssetValue, &self.total_asset_value),
            (Field::ChildrenEducation, &self.children_education),
            (Field::EmergencyFund, &self.emergency_fund),
            (Field::FuneralExpenses, &self.funeral_expenses),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeadRequest {
    form_data: LeadForm,
    #[serde(default)]
    params: QuoteRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    fee_rate: f64,
    params: CoverageParams,
    breakdown: CoverageBreakdown,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadResponse {
    status: &'static str,
    grand_total: f64,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    state: SubmitState,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn params_from_request(request: &QuoteRequest) -> Result<CoverageParams, String> {
    let mut params = CoverageParams::default();
    for (field, value) in request.fields() {
        if let Some(raw) = value {
            params =
                update_field(&params, field, raw.as_input()).map_err(|e| e.to_string())?;
        }
    }
    Ok(params)
}

fn validate_form(form: &LeadForm) -> Result<(), String> {
    if form.full_name.trim().is_empty() {
        return Err("fullName must not be empty".to_string());
    }
    if form.birth_date.trim().is_empty() {
        return Err("birthDate must not be empty".to_string());
    }
    if form.phone.trim().is_empty() {
        return Err("phone must not be empty".to_string());
    }
    if !form.email.contains('@') {
        return Err("email must contain '@'".to_string());
    }
    Ok(())
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let submitter = LeadSubmitter::new(config.webhook_url, config.mask_submit_failures)
        .map_err(std::io::Error::other)?;
    let state = ApiState {
        fee_rate: config.fee_rate,
        submitter: Arc::new(submitter),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/quote", get(quote_get_handler).post(quote_post_handler))
        .route("/api/lead", post(lead_handler))
        .route("/api/lead/status", get(lead_status_handler))
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!("coverage calculator listening on http://{addr}");
    info!("local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn quote_get_handler(
    State(state): State<ApiState>,
    Query(request): Query<QuoteRequest>,
) -> Response {
    quote_handler_impl(&state, request)
}

async fn quote_post_handler(
    State(state): State<ApiState>,
    Json(request): Json<QuoteRequest>,
) -> Response {
    quote_handler_impl(&state, request)
}

fn quote_handler_impl(state: &ApiState, request: QuoteRequest) -> Response {
    let params = match params_from_request(&request) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let breakdown = compute(&params, state.fee_rate);
    json_response(
        StatusCode::OK,
        QuoteResponse {
            fee_rate: state.fee_rate,
            params,
            breakdown,
        },
    )
}

async fn lead_handler(
    State(state): State<ApiState>,
    Json(request): Json<LeadRequest>,
) -> Response {
    if let Err(msg) = validate_form(&request.form_data) {
        return error_response(StatusCode::BAD_REQUEST, &msg);
    }
    let params = match params_from_request(&request.params) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let breakdown = compute(&params, state.fee_rate);
    let payload = QuotePayload::new(request.form_data, params, breakdown);

    match state.submitter.submit(&payload).await {
        Ok(SubmitOutcome::Delivered) | Ok(SubmitOutcome::MaskedFailure) => json_response(
            StatusCode::OK,
            LeadResponse {
                status: "accepted",
                grand_total: breakdown.grand_total,
            },
        ),
        Err(SubmitError::InFlight) => {
            error_response(StatusCode::CONFLICT, "a submission is already in flight")
        }
        Err(err) => error_response(StatusCode::BAD_GATEWAY, &err.to_string()),
    }
}

async fn lead_status_handler(State(state): State<ApiState>) -> Response {
    json_response(
        StatusCode::OK,
        StatusResponse {
            state: state.submitter.state(),
        },
    )
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
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
