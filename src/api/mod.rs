use axum::{
    routing::{get, post},
    Router,
};

use crate::ws::AppState;

pub mod handlers;
pub mod types;

use handlers::{
    draft_responses, generate_handler, get_draft, get_guide, get_scenario, guide_back, guide_next,
    list_scenarios, list_styles, start_guide,
};

/// Public API router backing the home, intake and results views.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/scenarios/{tag}", get(get_scenario))
        .route("/api/styles", get(list_styles))
        .route("/api/guide", post(start_guide))
        .route("/api/guide/{session_id}", get(get_guide))
        .route("/api/guide/{session_id}/next", post(guide_next))
        .route("/api/guide/{session_id}/back", post(guide_back))
        .route("/api/drafts/{session_id}", get(get_draft))
        .route("/api/drafts/{session_id}/responses", post(draft_responses))
}
