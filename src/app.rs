use crate::handlers;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/commands", post(handlers::post_command))
        .route("/api/tally", post(handlers::post_tally))
        .route("/api/users/:user_id", get(handlers::get_user))
        .route("/api/totals", get(handlers::get_totals))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .with_state(state)
}
