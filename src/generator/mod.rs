use anyhow::Result;
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::scenarios::{ScenarioTag, ToneTag};
use crate::templates::{self, GenerationKind};

pub mod fallback;

const ELLIPSIS: &str = "...";
const DEFAULT_MAX_CHARS: usize = 200;

// Simulated backend latency so callers exercise their loading states.
const LATENCY_MS: Range<u64> = 1500..2500;

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

// ------------------------------------------------------------
// TYPES
// ------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub scenario: ScenarioTag,
    #[serde(default)]
    pub tone: ToneTag,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSource {
    Generated,
    Fallback,
}

/// Generation result the view layer renders as it chooses. A fallback
/// reads like a normal reply; `source` is the only tell.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub output: String,
    pub source: OutcomeSource,
}

/// Development-time inspection envelope. Never consumed by business
/// logic; served on the internal router only.
#[derive(Debug, Clone, Serialize)]
pub struct DebugEnvelope {
    pub response: String,
    pub request: GenerateRequest,
    pub processing_time_ms: u64,
    pub timestamp: String,
    pub scenario: ScenarioTag,
    pub tone: ToneTag,
    pub kind: GenerationKind,
}

// ------------------------------------------------------------
// RESPONDER
// ------------------------------------------------------------
static TEMPLATE_ENV: Lazy<Environment<'static>> = Lazy::new(Environment::new);

/// Formats replies from the literal template tables. Holds no state
/// between calls; every call is self-contained.
pub struct Responder {
    latency_ms: Range<u64>,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder {
    pub fn new() -> Self {
        Self {
            latency_ms: LATENCY_MS,
        }
    }

    /// Honors RETORT_FAST_GENERATION=1 so local runs skip the
    /// simulated delay.
    pub fn from_env() -> Self {
        let fast = std::env::var("RETORT_FAST_GENERATION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if fast {
            Self::with_latency(0..1)
        } else {
            Self::new()
        }
    }

    pub fn with_latency(latency_ms: Range<u64>) -> Self {
        Self { latency_ms }
    }

    async fn simulate_latency(&self) {
        let ms = if self.latency_ms.is_empty() {
            0
        } else {
            rand::thread_rng().gen_range(self.latency_ms.clone())
        };
        if ms > 0 {
            sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Generate a reply for the request. Content is a pure function of
    /// (prompt, scenario, tone, kind); the latency jitter affects only
    /// timing.
    pub async fn generate(&self, req: &GenerateRequest, kind: GenerationKind) -> Result<String> {
        self.simulate_latency().await;

        let template = templates::select(req.scenario, req.tone, kind);
        let rendered =
            TEMPLATE_ENV.render_str(template, context! { prompt => req.prompt.as_str() })?;

        Ok(truncate_chars(rendered, req.max_chars))
    }

    /// Infallible variant: any propagated error is masked as one of the
    /// literal fallback sentences, tagged so the caller can tell.
    pub async fn generate_or_fallback(
        &self,
        req: &GenerateRequest,
        kind: GenerationKind,
    ) -> GenerationOutcome {
        match self.generate(req, kind).await {
            Ok(output) => GenerationOutcome {
                output,
                source: OutcomeSource::Generated,
            },
            Err(err) => {
                warn!(
                    scenario = req.scenario.as_str(),
                    tone = req.tone.as_str(),
                    kind = kind.as_str(),
                    error = %err,
                    "generation failed, substituting fallback"
                );
                fallback_outcome(kind)
            }
        }
    }

    /// Same pipeline plus wall-clock timing and a request echo.
    pub async fn generate_debug(
        &self,
        req: &GenerateRequest,
        kind: GenerationKind,
    ) -> Result<DebugEnvelope> {
        let started = Instant::now();
        let response = self.generate(req, kind).await?;
        let processing_time_ms = started.elapsed().as_millis() as u64;

        debug!(
            scenario = req.scenario.as_str(),
            tone = req.tone.as_str(),
            kind = kind.as_str(),
            processing_time_ms,
            response_chars = response.chars().count(),
            "debug generation completed"
        );

        Ok(DebugEnvelope {
            response,
            request: req.clone(),
            processing_time_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
            scenario: req.scenario,
            tone: req.tone,
            kind,
        })
    }
}

pub(crate) fn fallback_outcome(kind: GenerationKind) -> GenerationOutcome {
    GenerationOutcome {
        output: fallback::sample(kind).to_string(),
        source: OutcomeSource::Fallback,
    }
}

// Char-based, not byte-based: the templates are Chinese text.
fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::{ALL_SCENARIOS, ALL_TONES};

    fn instant_responder() -> Responder {
        Responder::with_latency(0..1)
    }

    #[tokio::test]
    async fn every_pair_embeds_the_prompt_verbatim() {
        let responder = instant_responder();
        for scenario in ALL_SCENARIOS {
            for tone in ALL_TONES {
                for kind in [GenerationKind::Response, GenerationKind::Suggestion] {
                    let req = GenerateRequest {
                        prompt: "测试输入".into(),
                        scenario: *scenario,
                        tone: *tone,
                        max_chars: 500,
                    };
                    let out = responder.generate(&req, kind).await.unwrap();
                    assert!(!out.is_empty());
                    let template = templates::select(*scenario, *tone, kind);
                    if template.contains("{{ prompt }}") {
                        assert!(
                            out.contains("测试输入"),
                            "prompt missing for {scenario}/{tone}: {out}"
                        );
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn over_length_output_is_truncated_exactly() {
        let responder = instant_responder();
        let req = GenerateRequest {
            prompt: "很长很长的输入".repeat(40),
            scenario: ScenarioTag::Work,
            tone: ToneTag::Attack,
            max_chars: 10,
        };
        let out = responder
            .generate(&req, GenerationKind::Response)
            .await
            .unwrap();
        assert_eq!(out.chars().count(), 13);
        assert!(out.ends_with(ELLIPSIS));
    }

    #[tokio::test]
    async fn under_length_output_is_unmodified_and_deterministic() {
        let responder = instant_responder();
        let req = GenerateRequest {
            prompt: "朋友借钱不还".into(),
            scenario: ScenarioTag::Relationship,
            tone: ToneTag::Sarcastic,
            max_chars: 500,
        };
        let first = responder
            .generate(&req, GenerationKind::Response)
            .await
            .unwrap();
        let second = responder
            .generate(&req, GenerationKind::Response)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!(!first.ends_with(ELLIPSIS));
        assert!(first.chars().count() <= 500);
    }

    #[tokio::test]
    async fn work_attack_end_to_end() {
        let responder = instant_responder();
        let req = GenerateRequest {
            prompt: "同事总是把自己的工作推给我做".into(),
            scenario: ScenarioTag::Work,
            tone: ToneTag::Attack,
            max_chars: 200,
        };
        let out = responder
            .generate(&req, GenerationKind::Response)
            .await
            .unwrap();
        assert!(out.contains("同事总是把自己的工作推给我做"));
        assert!(out.contains("推卸责任"));
        assert!(out.chars().count() <= 203);
    }

    #[tokio::test]
    async fn unknown_scenario_string_uses_general_family() {
        let responder = instant_responder();
        let req: GenerateRequest =
            serde_json::from_str(r#"{"prompt":"路人挑衅","scenario":"no-such-place"}"#).unwrap();
        assert_eq!(req.scenario, ScenarioTag::General);
        let out = responder
            .generate(&req, GenerationKind::Response)
            .await
            .unwrap();
        assert!(out.contains("路人挑衅"));
    }

    #[test]
    fn forced_failure_masks_as_known_fallback() {
        let outcome = fallback_outcome(GenerationKind::Response);
        assert_eq!(outcome.source, OutcomeSource::Fallback);
        assert!(fallback::RESPONSE_FALLBACKS.contains(&outcome.output.as_str()));
    }

    #[tokio::test]
    async fn debug_envelope_echoes_the_request() {
        let responder = instant_responder();
        let req = GenerateRequest {
            prompt: "邻居制造噪音影响休息".into(),
            scenario: ScenarioTag::Public,
            tone: ToneTag::XhsStyle,
            max_chars: 200,
        };
        let envelope = responder
            .generate_debug(&req, GenerationKind::Suggestion)
            .await
            .unwrap();
        assert_eq!(envelope.request.prompt, req.prompt);
        assert_eq!(envelope.scenario, ScenarioTag::Public);
        assert_eq!(envelope.kind, GenerationKind::Suggestion);
        assert!(envelope.response.contains("邻居制造噪音影响休息"));
        assert!(!envelope.timestamp.is_empty());
    }

    #[tokio::test]
    async fn defaults_fill_unset_fields() {
        let req: GenerateRequest = serde_json::from_str(r#"{"prompt":"随便说说"}"#).unwrap();
        assert_eq!(req.scenario, ScenarioTag::General);
        assert_eq!(req.tone, ToneTag::Default);
        assert_eq!(req.max_chars, 200);
    }
}
