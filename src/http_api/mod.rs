use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    GenerationRequest, KeywordExtractor, PlannerOptions, PlanningError, SeededChooser,
    SemesterPlan, Taxonomy,
    planner::Planner,
    report::{placeholder_map, render_text_report},
    scheduler::{ScheduleOutcome, SchedulerOptions, SemesterDates, schedule},
    unit::{RawUnit, parse_syllabus},
};

#[derive(Clone)]
pub struct AppState {
    taxonomy: Arc<RwLock<Taxonomy>>,
    options: PlannerOptions,
    extractor: Arc<KeywordExtractor>,
}

impl AppState {
    pub fn new(taxonomy: Taxonomy, options: PlannerOptions) -> Self {
        Self {
            taxonomy: Arc::new(RwLock::new(taxonomy)),
            options,
            extractor: Arc::new(KeywordExtractor::default()),
        }
    }

    pub fn with_shared(taxonomy: Arc<RwLock<Taxonomy>>, options: PlannerOptions) -> Self {
        Self {
            taxonomy,
            options,
            extractor: Arc::new(KeywordExtractor::default()),
        }
    }

    fn taxonomy(&self) -> Arc<RwLock<Taxonomy>> {
        self.taxonomy.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Unprocessable(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PlanningError> for ApiError {
    fn from(value: PlanningError) -> Self {
        ApiError::Unprocessable(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "planning_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Generation request plus per-call knobs.
#[derive(Debug, Deserialize)]
struct PlanPayload {
    #[serde(flatten)]
    request: GenerationRequest,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    options: Option<PlannerOptions>,
}

#[derive(Debug, Deserialize)]
struct SchedulePayload {
    #[serde(flatten)]
    dates: SemesterDates,
    #[serde(default)]
    options: Option<SchedulerOptions>,
}

#[derive(Debug, Deserialize)]
struct SyllabusPayload {
    text: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/taxonomy", get(get_taxonomy).put(update_taxonomy))
        .route("/plan", post(create_plan))
        .route("/plan/text", post(create_plan_text))
        .route("/plan/placeholders", post(create_plan_placeholders))
        .route("/schedule", post(create_schedule))
        .route("/units/parse", post(parse_units))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    taxonomy: Taxonomy,
    options: PlannerOptions,
) -> std::io::Result<()> {
    let state = AppState::new(taxonomy, options);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "semester planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_taxonomy(State(state): State<AppState>) -> Json<Taxonomy> {
    let taxonomy = state.taxonomy();
    let current = {
        let guard = taxonomy.read();
        guard.clone()
    };
    Json(current)
}

async fn update_taxonomy(
    State(state): State<AppState>,
    Json(replacement): Json<Taxonomy>,
) -> Result<Json<Taxonomy>, ApiError> {
    replacement
        .validate()
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    let taxonomy = state.taxonomy();
    {
        let mut guard = taxonomy.write();
        *guard = replacement.clone();
    }
    info!("taxonomy table replaced");
    Ok(Json(replacement))
}

fn run_planner(state: &AppState, payload: PlanPayload) -> Result<SemesterPlan, ApiError> {
    let taxonomy = {
        let guard = state.taxonomy.read();
        guard.clone()
    };
    let seed = payload.seed.unwrap_or_else(rand::random);
    let options = payload.options.unwrap_or_else(|| state.options.clone());
    let planner = Planner::new(&taxonomy, state.extractor.as_ref()).with_options(options);
    let mut chooser = SeededChooser::new(seed);
    let plan = planner.generate(&payload.request, &mut chooser).map_err(|err| {
        warn!(%err, "plan generation rejected");
        ApiError::from(err)
    })?;
    info!(seed, sessions = plan.sessions.len(), "plan generated over HTTP");
    Ok(plan)
}

async fn create_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Result<Json<SemesterPlan>, ApiError> {
    Ok(Json(run_planner(&state, payload)?))
}

async fn create_plan_text(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Result<String, ApiError> {
    let plan = run_planner(&state, payload)?;
    Ok(render_text_report(&plan))
}

async fn create_plan_placeholders(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let plan = run_planner(&state, payload)?;
    Ok(Json(placeholder_map(&plan)))
}

async fn create_schedule(
    State(state): State<AppState>,
    Json(payload): Json<SchedulePayload>,
) -> Result<Json<ScheduleOutcome>, ApiError> {
    let options = payload.options.unwrap_or(state.options.scheduler);
    let dates = payload
        .dates
        .with_recurring_holidays(&state.options.recurring_holidays);
    let outcome = schedule(&dates, &options)?;
    Ok(Json(outcome))
}

async fn parse_units(
    Json(payload): Json<SyllabusPayload>,
) -> Result<Json<Vec<RawUnit>>, ApiError> {
    let units = parse_syllabus(&payload.text);
    if units.is_empty() {
        return Err(ApiError::invalid("no 'Unidad' headings found in text"));
    }
    Ok(Json(units))
}
