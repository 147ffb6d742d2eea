use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/counters",
            get(handlers::list_counters).post(handlers::add_counter),
        )
        .route(
            "/api/counters/:id",
            put(handlers::update_counter).delete(handlers::remove_counter),
        )
        .route("/api/reload", post(handlers::reload))
        .with_state(state)
}
