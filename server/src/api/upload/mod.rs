//! Upload API module

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest(
        "/api/upload",
        Router::new()
            .route("/image", post(handler::upload))
            .route_layer(middleware::from_fn_with_state(state, require_auth)),
    )
}
