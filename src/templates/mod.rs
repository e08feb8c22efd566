use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

use crate::scenarios::{ScenarioTag, ToneTag};

// NOTE:
// Template sets are hand-authored Chinese sentences keyed by
// (scenario, tone, kind), with {{ prompt }} marking where the
// user's raw text is quoted in. Lookup is total: unknown
// scenarios use the general family, unsupported tones the
// family's default variant.

/// Which literal family a call selects: a reactive reply addressed
/// to the other party, or advice to the end user on what to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    #[default]
    Response,
    Suggestion,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Response => "response",
            GenerationKind::Suggestion => "suggestion",
        }
    }
}

#[derive(Deserialize)]
struct TemplateFile {
    default: String,
    scenarios: HashMap<String, HashMap<String, String>>,
}

struct TemplateSet {
    default_template: String,
    scenarios: HashMap<String, HashMap<String, String>>,
}

macro_rules! template_file {
    ($name:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/lang/zh/",
            $name,
            ".json"
        ))
    };
}

static RESPONSE_TEMPLATES: Lazy<TemplateSet> =
    Lazy::new(|| load_template_set(template_file!("responses")));
static SUGGESTION_TEMPLATES: Lazy<TemplateSet> =
    Lazy::new(|| load_template_set(template_file!("suggestions")));

fn load_template_set(raw: &str) -> TemplateSet {
    let parsed: TemplateFile = serde_json::from_str(raw).expect("invalid template config");
    TemplateSet {
        default_template: parsed.default,
        scenarios: parsed.scenarios,
    }
}

fn kind_templates(kind: GenerationKind) -> &'static TemplateSet {
    match kind {
        GenerationKind::Response => &RESPONSE_TEMPLATES,
        GenerationKind::Suggestion => &SUGGESTION_TEMPLATES,
    }
}

/// Select the literal template for a (scenario, tone, kind) triple.
/// Pure and total; every input maps to some template.
pub fn select(scenario: ScenarioTag, tone: ToneTag, kind: GenerationKind) -> &'static str {
    let set = kind_templates(kind);
    let family = set
        .scenarios
        .get(scenario.template_key())
        .or_else(|| set.scenarios.get("general"));

    family
        .and_then(|variants| {
            variants
                .get(tone.template_key())
                .or_else(|| variants.get("default"))
        })
        .map(String::as_str)
        .unwrap_or(set.default_template.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::{ALL_SCENARIOS, ALL_TONES};

    #[test]
    fn every_pair_has_a_template() {
        for scenario in ALL_SCENARIOS {
            for tone in ALL_TONES {
                for kind in [GenerationKind::Response, GenerationKind::Suggestion] {
                    let template = select(*scenario, *tone, kind);
                    assert!(
                        !template.is_empty(),
                        "empty template for {scenario}/{tone}/{}",
                        kind.as_str()
                    );
                }
            }
        }
    }

    #[test]
    fn work_attack_response_is_the_expected_sentence() {
        let template = select(ScenarioTag::Work, ToneTag::Attack, GenerationKind::Response);
        assert!(template.contains("{{ prompt }}"));
        assert!(template.contains("推卸责任"));
    }

    #[test]
    fn suggestions_are_addressed_to_the_user() {
        for scenario in ALL_SCENARIOS {
            let template = select(*scenario, ToneTag::Attack, GenerationKind::Suggestion);
            assert!(template.starts_with("针对你说的"), "unexpected: {template}");
        }
    }

    #[test]
    fn unsupported_tones_use_the_default_variant() {
        let polite = select(ScenarioTag::Work, ToneTag::Polite, GenerationKind::Response);
        let default = select(ScenarioTag::Work, ToneTag::Default, GenerationKind::Response);
        assert_eq!(polite, default);
    }
}
