use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::ws::AppState;

pub mod handlers;
pub mod types;

use handlers::{delete_session, internal_generate_debug, list_session_messages};

/// Internal router (no public exposure) for development-time
/// inspection: the debug generation variant and simulation
/// transcript access.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/internal/generate/debug", post(internal_generate_debug))
        .route(
            "/internal/sessions/{session_id}/messages",
            get(list_session_messages),
        )
        .route("/internal/sessions/{session_id}", delete(delete_session))
}
