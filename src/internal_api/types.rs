use serde::Deserialize;

use crate::generator::GenerateRequest;
use crate::templates::GenerationKind;

#[derive(Debug, Deserialize)]
pub struct InternalDebugBody {
    #[serde(flatten)]
    pub request: GenerateRequest,
    #[serde(default)]
    pub kind: GenerationKind,
}
