use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::allocation::{AllocationEngine, AllocationError, AllocationLimits};
use crate::calendar::{CalendarConfig, CalendarError, DayKind, parse_config_date, weekday_label};
use crate::persistence::validate_calendar_config;
use crate::result::AllocationResult;
use crate::task::RawTask;
use crate::parser;

#[derive(Clone)]
pub struct AppState {
    config: Arc<RwLock<CalendarConfig>>,
    limits: AllocationLimits,
}

impl AppState {
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            limits: AllocationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: AllocationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Copy of the current calendar. Runs never hold the lock.
    fn snapshot(&self) -> CalendarConfig {
        self.config.read().clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NoUsableRows,
    Invalid(String),
}

impl From<CalendarError> for ApiError {
    fn from(value: CalendarError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<AllocationError> for ApiError {
    fn from(value: AllocationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error, message) = match self {
            ApiError::NoUsableRows => (
                "no_usable_rows",
                "no usable rows found; check the input format".to_string(),
            ),
            ApiError::Invalid(message) => ("invalid_request", message),
        };
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllocateResponse {
    pub tasks: Vec<RawTask>,
    pub result: AllocationResult,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub kind: DayKind,
    pub is_workday: bool,
}

impl DayStatus {
    fn of(date: NaiveDate, config: &CalendarConfig) -> Self {
        let kind = config.classify(date);
        Self {
            date,
            day_of_week: weekday_label(date).to_string(),
            kind,
            is_workday: kind.is_workday(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config).put(update_config))
        .route("/config/days/:date", get(get_day))
        .route("/config/days/:date/toggle", post(toggle_day))
        .route("/parse", post(parse_text))
        .route("/allocate", post(allocate_text))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: CalendarConfig) -> std::io::Result<()> {
    let state = AppState::new(config).with_limits(AllocationLimits::from_env());
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_config(State(state): State<AppState>) -> Json<CalendarConfig> {
    Json(state.snapshot())
}

async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<CalendarConfig>,
) -> Result<Json<CalendarConfig>, ApiError> {
    validate_calendar_config(&config).map_err(|err| ApiError::Invalid(err.to_string()))?;
    *state.config.write() = config.clone();
    Ok(Json(config))
}

async fn get_day(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<DayStatus>, ApiError> {
    let date = parse_config_date(&raw)?;
    Ok(Json(DayStatus::of(date, &state.snapshot())))
}

async fn toggle_day(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<DayStatus>, ApiError> {
    let date = parse_config_date(&raw)?;
    let status = {
        let mut guard = state.config.write();
        let next = guard.toggled(date);
        *guard = next;
        DayStatus::of(date, &guard)
    };
    debug!(%date, kind = status.kind.as_str(), "toggled calendar day");
    Ok(Json(status))
}

fn parse_non_empty(text: &str) -> Result<Vec<RawTask>, ApiError> {
    let tasks = parser::parse(text);
    if tasks.is_empty() {
        return Err(ApiError::NoUsableRows);
    }
    Ok(tasks)
}

async fn parse_text(Json(payload): Json<TextPayload>) -> Result<Json<Vec<RawTask>>, ApiError> {
    Ok(Json(parse_non_empty(&payload.text)?))
}

async fn allocate_text(
    State(state): State<AppState>,
    Json(payload): Json<TextPayload>,
) -> Result<Json<AllocateResponse>, ApiError> {
    let tasks = parse_non_empty(&payload.text)?;
    let config = state.snapshot();
    let result = AllocationEngine::new(&tasks, &config)
        .with_limits(state.limits)
        .run()?;
    Ok(Json(AllocateResponse { tasks, result }))
}
