use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::{InterfaceView, NetworkService};
use crate::domain::{Interface, InterfaceType, RegistryError, TopologyIndex};

/// Error returned by handlers, mapped onto an HTTP status
#[derive(Debug)]
pub enum AppError {
    Registry(RegistryError),
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Registry(RegistryError::ConflictingMembership { .. }) => StatusCode::CONFLICT,
            AppError::Registry(RegistryError::NamesExhausted { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let message = match self {
            AppError::Registry(e) => e.to_string(),
            AppError::BadRequest(msg) => msg,
        };

        if status.is_server_error() {
            warn!("Request failed: {}", message);
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError::Registry(err)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub network_service: Arc<NetworkService>,
}

/// Response for /api/interfaces
#[derive(Debug, Serialize)]
pub struct InterfacesResponse {
    pub timestamp: String,
    pub interfaces: Vec<InterfaceView>,
    pub known_names: Vec<String>,
}

/// Response for /api/topology
#[derive(Debug, Serialize)]
pub struct TopologyResponse {
    pub timestamp: String,
    #[serde(flatten)]
    pub topology: TopologyIndex,
}

/// Response for the slave listing endpoints
#[derive(Debug, Serialize)]
pub struct SlavesResponse {
    pub master: String,
    pub slaves: Vec<String>,
}

/// Response for the candidate endpoints
#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub master: String,
    pub candidates: Vec<Interface>,
}

/// Response for the naming endpoints
#[derive(Debug, Serialize)]
pub struct NamesResponse {
    pub prefix: String,
    pub names: Vec<String>,
}

/// Query params for /api/names/free
#[derive(Debug, Deserialize)]
pub struct FreeNamesQuery {
    pub prefix: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

/// Upper limit on names requested in one call
const MAX_NAMES_PER_REQUEST: usize = 64;

/// Handler for GET /health
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "netreg"
        })),
    )
}

/// Handler for GET /api/interfaces
pub async fn interfaces_handler(State(state): State<AppState>) -> Json<InterfacesResponse> {
    let service = &state.network_service;

    Json(InterfacesResponse {
        timestamp: chrono::Utc::now().to_rfc3339(),
        interfaces: service.interface_views(),
        known_names: service.registry().known_names().into_iter().collect(),
    })
}

/// Handler for GET /api/interfaces/{name}
pub async fn interface_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Interface>, AppError> {
    Ok(Json(state.network_service.interface(&name)?))
}

/// Handler for GET /api/topology
pub async fn topology_handler(State(state): State<AppState>) -> Json<TopologyResponse> {
    Json(TopologyResponse {
        timestamp: chrono::Utc::now().to_rfc3339(),
        topology: state.network_service.topology(),
    })
}

/// Handler for GET /api/bonds/{name}/slaves
pub async fn bond_slaves_handler(
    State(state): State<AppState>,
    Path(master): Path<String>,
) -> Json<SlavesResponse> {
    let slaves = state.network_service.bond_slaves(&master);
    Json(SlavesResponse { master, slaves })
}

/// Handler for GET /api/bridges/{name}/slaves
pub async fn bridge_slaves_handler(
    State(state): State<AppState>,
    Path(master): Path<String>,
) -> Json<SlavesResponse> {
    let slaves = state.network_service.bridge_slaves(&master);
    Json(SlavesResponse { master, slaves })
}

/// Handler for GET /api/bonds/{name}/candidates
pub async fn bond_candidates_handler(
    State(state): State<AppState>,
    Path(master): Path<String>,
) -> Json<CandidatesResponse> {
    let candidates = state.network_service.bond_candidates(&master);
    Json(CandidatesResponse { master, candidates })
}

/// Handler for GET /api/bridges/{name}/candidates
pub async fn bridge_candidates_handler(
    State(state): State<AppState>,
    Path(master): Path<String>,
) -> Json<CandidatesResponse> {
    let candidates = state.network_service.bridge_candidates(&master);
    Json(CandidatesResponse { master, candidates })
}

/// Handler for GET /api/names/free
pub async fn free_names_handler(
    State(state): State<AppState>,
    Query(params): Query<FreeNamesQuery>,
) -> Result<Json<NamesResponse>, AppError> {
    if params.count > MAX_NAMES_PER_REQUEST {
        return Err(AppError::BadRequest(format!(
            "count must not exceed {}",
            MAX_NAMES_PER_REQUEST
        )));
    }

    let names = state.network_service.free_names(&params.prefix, params.count)?;
    Ok(Json(NamesResponse {
        prefix: params.prefix,
        names,
    }))
}

/// Handler for GET /api/names/propose/{type}
pub async fn propose_name_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<NamesResponse>, AppError> {
    let kind: InterfaceType = kind.parse().map_err(AppError::BadRequest)?;
    let name = state.network_service.propose_name(kind)?;

    Ok(Json(NamesResponse {
        prefix: kind.name_prefix().to_string(),
        names: vec![name],
    }))
}
