use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::{
    compute_grid, compute_polar, resolve_polar, FireError, FireOutcome, FiringSolution, GridMission,
    MunitionProfile, PolarMission, ResolveRequest, ResolveResponse, SolverConfig, UnreachableTarget,
};

// =====================
// Application state
// =====================
pub struct AppState {
    pub solver: SolverConfig,
}

// =====================
// API types
// =====================
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct MunitionListResponse {
    pub munitions: Vec<&'static MunitionProfile>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<UnreachableTarget>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn invalid_input(err: FireError) -> ApiError {
    let kind = match &err {
        FireError::UnknownMunition(_) => "unknown_munition",
        FireError::InvalidInput { .. } => "invalid_input",
    };
    warn!(error = %err, "rejected request");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
            kind,
            target: None,
        }),
    )
}

fn into_response(outcome: Result<FireOutcome, FireError>) -> Result<Json<FiringSolution>, ApiError> {
    match outcome.map_err(invalid_input)? {
        FireOutcome::Solved(solution) => Ok(Json(solution)),
        FireOutcome::Unreachable(target) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "Target unreachable".to_string(),
                kind: "unreachable",
                target: Some(target),
            }),
        )),
    }
}

// =====================
// Router builder
// =====================

pub fn build_app_with_state(solver: SolverConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState { solver });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app: Router<Arc<AppState>> = Router::new()
        // Health & info
        .route("/api/health", get(health_check))
        .route("/api/munitions", get(list_munitions))
        // Calculate
        .route("/api/calculate", post(calculate))
        .route("/api/calculate_elevation", post(calculate_elevation))
        .route("/api/calculate_elevation_grid", post(calculate_elevation_grid))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let app: Router = app.with_state::<()>(state.clone());

    (app, state)
}

pub fn build_app(solver: SolverConfig) -> Router {
    build_app_with_state(solver).0
}

// =====================
// Handlers
// =====================

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_munitions() -> Json<MunitionListResponse> {
    Json(MunitionListResponse {
        munitions: MunitionProfile::all().iter().collect(),
    })
}

pub async fn calculate(Json(req): Json<ResolveRequest>) -> Result<Json<ResolveResponse>, ApiError> {
    resolve_polar(&req).map(Json).map_err(invalid_input)
}

pub async fn calculate_elevation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PolarMission>,
) -> Result<Json<FiringSolution>, ApiError> {
    into_response(compute_polar(&req, &state.solver))
}

pub async fn calculate_elevation_grid(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GridMission>,
) -> Result<Json<FiringSolution>, ApiError> {
    into_response(compute_grid(&req, &state.solver))
}
