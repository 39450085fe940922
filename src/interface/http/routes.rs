use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::application::NetworkService;

use super::handlers::{
    bond_candidates_handler, bond_slaves_handler, bridge_candidates_handler, bridge_slaves_handler,
    free_names_handler, health_handler, interface_handler, interfaces_handler, propose_name_handler,
    topology_handler, AppState,
};

pub fn create_router(network_service: Arc<NetworkService>) -> Router {
    let state = AppState { network_service };

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/interfaces", get(interfaces_handler))
        .route("/api/interfaces/{name}", get(interface_handler))
        .route("/api/topology", get(topology_handler))
        .route("/api/bonds/{name}/slaves", get(bond_slaves_handler))
        .route("/api/bonds/{name}/candidates", get(bond_candidates_handler))
        .route("/api/bridges/{name}/slaves", get(bridge_slaves_handler))
        .route("/api/bridges/{name}/candidates", get(bridge_candidates_handler))
        .route("/api/names/free", get(free_names_handler))
        .route("/api/names/propose/{kind}", get(propose_name_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
