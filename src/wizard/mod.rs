use serde::{Deserialize, Serialize};

use crate::model::draft::DraftRecord;
use crate::scenarios::ScenarioTag;

// The three-question intake flow: describe what happened, pick a
// communication goal, optionally add detail, then submit. The only
// validation rule in the system is that the description must be
// non-empty before leaving the first step. Backward moves are
// unguarded.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideStep {
    Describe,
    Goal,
    Supplement,
}

impl GuideStep {
    pub fn index(&self) -> usize {
        match self {
            GuideStep::Describe => 0,
            GuideStep::Goal => 1,
            GuideStep::Supplement => 2,
        }
    }
}

/// Field updates a client may attach to a step change. Absent fields
/// leave the stored answer untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuideUpdate {
    pub description: Option<String>,
    pub emotion: Option<String>,
    pub goal: Option<String>,
    pub additional_info: Option<String>,
}

/// What an advance attempt did.
#[derive(Debug, Clone)]
pub enum Advance {
    /// Guard tripped; the step index is unchanged.
    Blocked,
    Moved(GuideStep),
    /// Final step submitted; answers serialized into a draft.
    Submitted(DraftRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideSession {
    pub id: String,
    pub scenario: ScenarioTag,
    pub step: GuideStep,
    #[serde(default)]
    pub description: String,
    pub emotion: Option<String>,
    pub goal: Option<String>,
    #[serde(default)]
    pub additional_info: String,
    pub updated_ts: i64,
}

impl GuideSession {
    pub fn new(scenario: ScenarioTag) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scenario,
            step: GuideStep::Describe,
            description: String::new(),
            emotion: None,
            goal: None,
            additional_info: String::new(),
            updated_ts: chrono::Utc::now().timestamp(),
        }
    }

    pub fn apply(&mut self, update: GuideUpdate) {
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(emotion) = update.emotion {
            self.emotion = Some(emotion);
        }
        if let Some(goal) = update.goal {
            self.goal = Some(goal);
        }
        if let Some(additional_info) = update.additional_info {
            self.additional_info = additional_info;
        }
        self.updated_ts = chrono::Utc::now().timestamp();
    }

    pub fn advance(&mut self) -> Advance {
        match self.step {
            GuideStep::Describe => {
                if self.description.trim().is_empty() {
                    return Advance::Blocked;
                }
                self.step = GuideStep::Goal;
                Advance::Moved(self.step)
            }
            GuideStep::Goal => {
                self.step = GuideStep::Supplement;
                Advance::Moved(self.step)
            }
            GuideStep::Supplement => Advance::Submitted(self.to_draft()),
        }
    }

    pub fn back(&mut self) -> GuideStep {
        self.step = match self.step {
            GuideStep::Describe | GuideStep::Goal => GuideStep::Describe,
            GuideStep::Supplement => GuideStep::Goal,
        };
        self.step
    }

    fn to_draft(&self) -> DraftRecord {
        DraftRecord {
            scenario: self.scenario,
            description: self.description.clone(),
            emotion: self.emotion.clone(),
            goal: self.goal.clone(),
            additional_info: self.additional_info.clone(),
            created_ts: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_blocks_the_first_step() {
        let mut session = GuideSession::new(ScenarioTag::Work);
        assert!(matches!(session.advance(), Advance::Blocked));
        assert_eq!(session.step.index(), 0);

        session.apply(GuideUpdate {
            description: Some("   ".into()),
            ..Default::default()
        });
        assert!(matches!(session.advance(), Advance::Blocked));
        assert_eq!(session.step.index(), 0);
    }

    #[test]
    fn non_empty_description_advances_by_exactly_one() {
        let mut session = GuideSession::new(ScenarioTag::Family);
        session.apply(GuideUpdate {
            description: Some("父母总是催我结婚生子".into()),
            emotion: Some("helpless".into()),
            ..Default::default()
        });
        assert!(matches!(session.advance(), Advance::Moved(GuideStep::Goal)));
        assert_eq!(session.step.index(), 1);
    }

    #[test]
    fn full_run_submits_a_draft() {
        let mut session = GuideSession::new(ScenarioTag::Consumer);
        session.apply(GuideUpdate {
            description: Some("商品质量有问题但商家拒绝退款".into()),
            emotion: Some("angry".into()),
            ..Default::default()
        });
        assert!(matches!(session.advance(), Advance::Moved(GuideStep::Goal)));

        session.apply(GuideUpdate {
            goal: Some("attack".into()),
            ..Default::default()
        });
        assert!(matches!(
            session.advance(),
            Advance::Moved(GuideStep::Supplement)
        ));

        session.apply(GuideUpdate {
            additional_info: Some("已保留聊天记录和发票".into()),
            ..Default::default()
        });
        let draft = match session.advance() {
            Advance::Submitted(draft) => draft,
            other => panic!("expected submit, got {other:?}"),
        };
        assert_eq!(draft.scenario, ScenarioTag::Consumer);
        assert_eq!(draft.description, "商品质量有问题但商家拒绝退款");
        assert_eq!(draft.goal.as_deref(), Some("attack"));
        assert_eq!(draft.additional_info, "已保留聊天记录和发票");
    }

    #[test]
    fn back_is_unguarded_and_saturates() {
        let mut session = GuideSession::new(ScenarioTag::Public);
        session.apply(GuideUpdate {
            description: Some("有人插队还理直气壮".into()),
            ..Default::default()
        });
        session.advance();
        session.advance();
        assert_eq!(session.step, GuideStep::Supplement);
        assert_eq!(session.back(), GuideStep::Goal);
        assert_eq!(session.back(), GuideStep::Describe);
        assert_eq!(session.back(), GuideStep::Describe);
    }
}
