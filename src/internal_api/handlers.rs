use axum::extract::{Json, Path, State};
use serde_json::json;
use tracing::info;

use crate::{internal_api::types::InternalDebugBody, ws::AppState};

/// Debug variant of the generation call: same template path as
/// production plus timing and a request echo. Development-only.
pub async fn internal_generate_debug(
    State(state): State<AppState>,
    Json(body): Json<InternalDebugBody>,
) -> Json<serde_json::Value> {
    info!(
        scenario = body.request.scenario.as_str(),
        tone = body.request.tone.as_str(),
        kind = body.kind.as_str(),
        prompt = body.request.prompt.as_str(),
        "debug generation requested"
    );

    match state.responder.generate_debug(&body.request, body.kind).await {
        Ok(envelope) => Json(json!(envelope)),
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

pub async fn list_session_messages(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    match state.db.list_messages_for_session(&session_id).await {
        Ok(mut msgs) => {
            msgs.sort_by_key(|m| m.ts);
            Json(json!({
                "session_id": session_id,
                "messages": msgs,
            }))
        }
        Err(e) => Json(json!({
            "session_id": session_id,
            "messages": [],
            "error": e.to_string()
        })),
    }
}

pub async fn delete_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    match state.db.delete_session(&session_id).await {
        Ok(removed) => Json(json!({
            "session_id": session_id,
            "deleted": true,
            "removed_messages": removed
        })),
        Err(e) => Json(json!({
            "session_id": session_id,
            "deleted": false,
            "error": e.to_string()
        })),
    }
}
