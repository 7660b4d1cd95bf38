//! Auth API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/auth", auth_routes(state))
}

fn auth_routes(state: ServerState) -> Router<ServerState> {
    let protected = Router::new()
        .route("/me", get(handler::me))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/telegram", post(handler::telegram_login))
        .route("/role", put(handler::set_role))
        .merge(protected)
}
