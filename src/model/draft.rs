use serde::{Deserialize, Serialize};

use crate::scenarios::ScenarioTag;

/// The flat record an intake run hands to the results view. Overwritten
/// wholesale on each new run for the same session; no versioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub scenario: ScenarioTag,
    pub description: String,
    pub emotion: Option<String>,
    pub goal: Option<String>,
    #[serde(default)]
    pub additional_info: String,
    pub created_ts: i64,
}
