use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    api::types::{
        DraftResponsesBody, DraftResponsesView, GenerateBody, GuideAdvanceResponse, GuideView,
        ScenarioDetail, StartGuideBody,
    },
    generator::{GenerateRequest, GenerationOutcome},
    scenarios::{self, ScenarioTag},
    templates::GenerationKind,
    wizard::{Advance, GuideSession, GuideUpdate},
    ws::AppState,
};

const MAX_ALTERNATIVES: usize = 5;
const DEFAULT_ALTERNATIVES: usize = 2;

// ------------------------------------------------------------
// GENERATION
// ------------------------------------------------------------
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Json<GenerationOutcome> {
    info!(
        scenario = body.request.scenario.as_str(),
        tone = body.request.tone.as_str(),
        kind = body.kind.as_str(),
        prompt_chars = body.request.prompt.chars().count(),
        "generation requested"
    );

    let outcome = state
        .responder
        .generate_or_fallback(&body.request, body.kind)
        .await;

    Json(outcome)
}

// ------------------------------------------------------------
// CATALOG (home / intake views)
// ------------------------------------------------------------
pub async fn list_scenarios() -> Json<serde_json::Value> {
    Json(json!({ "scenarios": scenarios::catalog() }))
}

pub async fn get_scenario(Path(tag): Path<String>) -> Json<serde_json::Value> {
    let tag = ScenarioTag::parse_loose(&tag);
    match scenarios::scenario_info(tag) {
        Some(info) => Json(json!(ScenarioDetail {
            info,
            emotions: scenarios::emotions(),
            goals: scenarios::communication_goals(),
        })),
        None => Json(json!({
            "scenario": tag,
            "error": "scenario_not_found"
        })),
    }
}

pub async fn list_styles() -> Json<serde_json::Value> {
    Json(json!({ "styles": scenarios::response_styles() }))
}

// ------------------------------------------------------------
// INTAKE WIZARD
// ------------------------------------------------------------
pub async fn start_guide(
    State(state): State<AppState>,
    Json(body): Json<StartGuideBody>,
) -> Json<serde_json::Value> {
    let session = GuideSession::new(body.scenario);

    match state.db.save_guide_session(&session).await {
        Ok(()) => Json(json!({ "session": GuideView::from_session(&session) })),
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

pub async fn get_guide(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    match state.db.load_guide_session(&session_id).await {
        Ok(Some(session)) => Json(json!({ "session": GuideView::from_session(&session) })),
        Ok(None) => Json(json!({ "session_id": session_id, "error": "guide_not_found" })),
        Err(e) => Json(json!({ "session_id": session_id, "error": e.to_string() })),
    }
}

pub async fn guide_next(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(update): Json<GuideUpdate>,
) -> Json<serde_json::Value> {
    let mut session = match state.db.load_guide_session(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Json(json!({ "session_id": session_id, "error": "guide_not_found" }));
        }
        Err(e) => return Json(json!({ "session_id": session_id, "error": e.to_string() })),
    };

    session.apply(update);
    let advance = session.advance();

    let (blocked, completed, draft) = match advance {
        Advance::Blocked => (true, false, None),
        Advance::Moved(_) => (false, false, None),
        Advance::Submitted(draft) => (false, true, Some(draft)),
    };

    if let Some(draft) = draft.as_ref() {
        info!(
            session_id = session_id.as_str(),
            scenario = draft.scenario.as_str(),
            "intake completed, draft persisted"
        );
        if let Err(e) = state.db.save_draft(&session_id, draft).await {
            return Json(json!({ "session_id": session_id, "error": e.to_string() }));
        }
    }

    if let Err(e) = state.db.save_guide_session(&session).await {
        return Json(json!({ "session_id": session_id, "error": e.to_string() }));
    }

    Json(json!(GuideAdvanceResponse {
        session: GuideView::from_session(&session),
        blocked,
        completed,
        draft,
    }))
}

pub async fn guide_back(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    let mut session = match state.db.load_guide_session(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Json(json!({ "session_id": session_id, "error": "guide_not_found" }));
        }
        Err(e) => return Json(json!({ "session_id": session_id, "error": e.to_string() })),
    };

    session.back();

    if let Err(e) = state.db.save_guide_session(&session).await {
        return Json(json!({ "session_id": session_id, "error": e.to_string() }));
    }

    Json(json!({ "session": GuideView::from_session(&session) }))
}

// ------------------------------------------------------------
// DRAFTS (results view)
// ------------------------------------------------------------
pub async fn get_draft(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    match state.db.load_draft(&session_id).await {
        Ok(Some(draft)) => Json(json!({ "session_id": session_id, "draft": draft })),
        Ok(None) => Json(json!({ "session_id": session_id, "error": "draft_not_found" })),
        Err(e) => Json(json!({ "session_id": session_id, "error": e.to_string() })),
    }
}

/// The results view's alternatives loop: N sequential generations over
/// the draft's description, awaited one at a time, de-duplicated.
pub async fn draft_responses(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<DraftResponsesBody>,
) -> Json<serde_json::Value> {
    let draft = match state.db.load_draft(&session_id).await {
        Ok(Some(draft)) => draft,
        Ok(None) => {
            return Json(json!({ "session_id": session_id, "error": "draft_not_found" }));
        }
        Err(e) => return Json(json!({ "session_id": session_id, "error": e.to_string() })),
    };

    let count = body
        .count
        .unwrap_or(DEFAULT_ALTERNATIVES)
        .clamp(1, MAX_ALTERNATIVES);

    let request = GenerateRequest {
        prompt: draft.description.clone(),
        scenario: draft.scenario,
        tone: body.tone,
        max_chars: 200,
    };

    let mut responses: Vec<GenerationOutcome> = Vec::with_capacity(count);
    for _ in 0..count {
        let outcome = state
            .responder
            .generate_or_fallback(&request, GenerationKind::Response)
            .await;
        // Identical alternatives add nothing; keep first occurrences.
        if !responses.iter().any(|r| r.output == outcome.output) {
            responses.push(outcome);
        }
    }

    Json(json!(DraftResponsesView {
        session_id,
        tone: body.tone,
        responses,
    }))
}
