use serde::{Deserialize, Serialize};

use crate::generator::{GenerateRequest, GenerationOutcome};
use crate::model::draft::DraftRecord;
use crate::scenarios::{EmotionOption, GoalOption, ScenarioInfo, ScenarioTag, ToneTag};
use crate::templates::GenerationKind;
use crate::wizard::{GuideSession, GuideStep};

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    #[serde(flatten)]
    pub request: GenerateRequest,
    #[serde(default)]
    pub kind: GenerationKind,
}

#[derive(Debug, Serialize)]
pub struct ScenarioDetail {
    #[serde(flatten)]
    pub info: &'static ScenarioInfo,
    pub emotions: &'static [EmotionOption],
    pub goals: &'static [GoalOption],
}

#[derive(Debug, Default, Deserialize)]
pub struct StartGuideBody {
    #[serde(default)]
    pub scenario: ScenarioTag,
}

#[derive(Debug, Serialize)]
pub struct GuideView {
    pub session_id: String,
    pub scenario: ScenarioTag,
    pub step: GuideStep,
    pub step_index: usize,
    pub description: String,
    pub emotion: Option<String>,
    pub goal: Option<String>,
    pub additional_info: String,
}

impl GuideView {
    pub fn from_session(session: &GuideSession) -> Self {
        Self {
            session_id: session.id.clone(),
            scenario: session.scenario,
            step: session.step,
            step_index: session.step.index(),
            description: session.description.clone(),
            emotion: session.emotion.clone(),
            goal: session.goal.clone(),
            additional_info: session.additional_info.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GuideAdvanceResponse {
    pub session: GuideView,
    pub blocked: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<DraftRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DraftResponsesBody {
    #[serde(default)]
    pub tone: ToneTag,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DraftResponsesView {
    pub session_id: String,
    pub tone: ToneTag,
    pub responses: Vec<GenerationOutcome>,
}
