use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// NOTE:
// Scenario and tone sets are closed. Anything outside the known
// set coerces to the general/default member instead of failing,
// so dispatch downstream stays total.

// ------------------------------------------------------------
// SCENARIO TAGS
// ------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScenarioTag {
    Work,
    Family,
    Consumer,
    Public,
    Relationship,
    Emergency,
    #[default]
    General,
}

pub const ALL_SCENARIOS: &[ScenarioTag] = &[
    ScenarioTag::Work,
    ScenarioTag::Family,
    ScenarioTag::Consumer,
    ScenarioTag::Public,
    ScenarioTag::Relationship,
    ScenarioTag::Emergency,
    ScenarioTag::General,
];

impl ScenarioTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioTag::Work => "work",
            ScenarioTag::Family => "family",
            ScenarioTag::Consumer => "consumer",
            ScenarioTag::Public => "public",
            ScenarioTag::Relationship => "relationship",
            ScenarioTag::Emergency => "emergency",
            ScenarioTag::General => "general",
        }
    }

    /// Template family key. Emergency has catalog presence only and
    /// shares the general template family.
    pub fn template_key(&self) -> &'static str {
        match self {
            ScenarioTag::Emergency => "general",
            other => other.as_str(),
        }
    }

    pub fn parse_loose(input: &str) -> Self {
        match normalize(input).as_str() {
            "work" | "workplace" | "job" | "office" => ScenarioTag::Work,
            "family" | "relatives" => ScenarioTag::Family,
            "consumer" | "shopping" | "service" => ScenarioTag::Consumer,
            "public" | "street" => ScenarioTag::Public,
            "relationship" | "partner" | "couple" => ScenarioTag::Relationship,
            "emergency" | "urgent" => ScenarioTag::Emergency,
            _ => ScenarioTag::General,
        }
    }
}

impl fmt::Display for ScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioTag {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_loose(s))
    }
}

impl Serialize for ScenarioTag {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_str())
    }
}

// Forgiving deserializer: unknown or missing strings become General.
impl<'de> Deserialize<'de> for ScenarioTag {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = match String::deserialize(de) {
            Ok(s) => s,
            Err(_) => return Ok(ScenarioTag::General),
        };
        Ok(Self::parse_loose(&s))
    }
}

// ------------------------------------------------------------
// TONE TAGS
// ------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneTag {
    /// The firm "strong" register the original app defaults to.
    #[default]
    Default,
    Attack,
    Sarcastic,
    XhsStyle,
    Polite,
    Witty,
    Direct,
}

pub const ALL_TONES: &[ToneTag] = &[
    ToneTag::Default,
    ToneTag::Attack,
    ToneTag::Sarcastic,
    ToneTag::XhsStyle,
    ToneTag::Polite,
    ToneTag::Witty,
    ToneTag::Direct,
];

impl ToneTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneTag::Default => "default",
            ToneTag::Attack => "attack",
            ToneTag::Sarcastic => "sarcastic",
            ToneTag::XhsStyle => "xhs_style",
            ToneTag::Polite => "polite",
            ToneTag::Witty => "witty",
            ToneTag::Direct => "direct",
        }
    }

    /// Template variant key. Polite/Witty/Direct have no dedicated
    /// variant yet and use the default one.
    pub fn template_key(&self) -> &'static str {
        match self {
            ToneTag::Attack => "attack",
            ToneTag::Sarcastic => "sarcastic",
            ToneTag::XhsStyle => "xhs_style",
            _ => "default",
        }
    }

    pub fn parse_loose(input: &str) -> Self {
        match normalize(input).as_str() {
            "attack" | "aggressive" => ToneTag::Attack,
            "sarcastic" | "sarcasm" | "irony" => ToneTag::Sarcastic,
            "xhsstyle" | "xhs" => ToneTag::XhsStyle,
            "polite" => ToneTag::Polite,
            "witty" => ToneTag::Witty,
            "direct" => ToneTag::Direct,
            _ => ToneTag::Default,
        }
    }
}

impl fmt::Display for ToneTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToneTag {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_loose(s))
    }
}

impl Serialize for ToneTag {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ToneTag {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = match String::deserialize(de) {
            Ok(s) => s,
            Err(_) => return Ok(ToneTag::Default),
        };
        Ok(Self::parse_loose(&s))
    }
}

fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ------------------------------------------------------------
// CATALOG (intake and results view data)
// ------------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioInfo {
    pub tag: ScenarioTag,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub common_issues: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct EmotionOption {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalOption {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleOption {
    pub tone: ToneTag,
    pub title: &'static str,
    pub icon: &'static str,
}

pub fn catalog() -> &'static [ScenarioInfo] {
    &[
        ScenarioInfo {
            tag: ScenarioTag::Work,
            title: "职场冲突",
            icon: "🏢",
            description: "处理与同事、上级、下属之间的矛盾和分歧",
            common_issues: &[
                "同事总是把自己的工作推给我做",
                "上司经常在公开场合批评我",
                "下属不服从工作安排",
                "同事总是抢占功劳",
            ],
        },
        ScenarioInfo {
            tag: ScenarioTag::Family,
            title: "家庭与亲友",
            icon: "👨‍👩‍👧",
            description: "应对催婚、攀比、观念不合等家庭矛盾",
            common_issues: &[
                "父母总是催我结婚生子",
                "亲戚总是拿我和别人比较",
                "家人干涉我的个人生活",
                "兄弟姐妹之间财产分配不均",
            ],
        },
        ScenarioInfo {
            tag: ScenarioTag::Consumer,
            title: "消费纠纷",
            icon: "🛒",
            description: "处理与客服、商家、物业之间的维权沟通",
            common_issues: &[
                "商品质量有问题但商家拒绝退款",
                "客服态度恶劣不作为",
                "物业收费不合理但服务差",
                "买到假货商家不承认",
            ],
        },
        ScenarioInfo {
            tag: ScenarioTag::Public,
            title: "公共场合",
            icon: "🚦",
            description: "应对邻里、路人、排队等公共场合的突发冲突",
            common_issues: &[
                "邻居制造噪音影响休息",
                "有人插队还理直气壮",
                "路人故意挑衅引发冲突",
                "公共场所遇到不文明行为",
            ],
        },
        ScenarioInfo {
            tag: ScenarioTag::Relationship,
            title: "亲密关系",
            icon: "💔",
            description: "处理与伴侣、好友之间的矛盾和分歧",
            common_issues: &[
                "伴侣总是忽视我的感受",
                "朋友借钱不还",
                "亲密的人总是贬低我",
                "对方总是欺骗我",
            ],
        },
        ScenarioInfo {
            tag: ScenarioTag::Emergency,
            title: "紧急情况",
            icon: "🚨",
            description: "快速应对突发冲突的紧急策略",
            common_issues: &[
                "遇到突发冲突需要立即回应",
                "有人正在对我进行言语攻击",
                "需要快速应对挑衅行为",
                "紧急情况下需要有力反击",
            ],
        },
    ]
}

pub fn scenario_info(tag: ScenarioTag) -> Option<&'static ScenarioInfo> {
    catalog().iter().find(|info| info.tag == tag)
}

pub fn emotions() -> &'static [EmotionOption] {
    &[
        EmotionOption { id: "angry", label: "愤怒", icon: "😡" },
        EmotionOption { id: "sad", label: "委屈", icon: "😢" },
        EmotionOption { id: "helpless", label: "无奈", icon: "🤷" },
        EmotionOption { id: "anxious", label: "焦虑", icon: "😰" },
        EmotionOption { id: "calm", label: "冷静", icon: "😌" },
    ]
}

pub fn communication_goals() -> &'static [GoalOption] {
    &[
        GoalOption { id: "argue", label: "据理力争", description: "坚持自己的立场和观点" },
        GoalOption { id: "ease", label: "缓和关系", description: "保持和谐，避免矛盾升级" },
        GoalOption { id: "boundary", label: "划清界限", description: "明确表达自己的底线和边界" },
        GoalOption { id: "solve", label: "解决问题", description: "专注于找到解决方案" },
        GoalOption { id: "attack", label: "强势反击", description: "直接有力地回击对方，维护自己的立场" },
        GoalOption { id: "sarcastic", label: "阴阳怪气", description: "用讽刺和幽默的方式回应对方" },
    ]
}

pub fn response_styles() -> &'static [StyleOption] {
    &[
        StyleOption { tone: ToneTag::Default, title: "坚定有力版", icon: "💪" },
        StyleOption { tone: ToneTag::Polite, title: "礼貌得体版", icon: "🙂" },
        StyleOption { tone: ToneTag::Witty, title: "机智回应版", icon: "😏" },
        StyleOption { tone: ToneTag::Direct, title: "直截了当版", icon: "🎯" },
        StyleOption { tone: ToneTag::Attack, title: "强势反击版", icon: "⚔️" },
        StyleOption { tone: ToneTag::Sarcastic, title: "阴阳怪气版", icon: "😒" },
        StyleOption { tone: ToneTag::XhsStyle, title: "小红书风格", icon: "📕" },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scenario_coerces_to_general() {
        assert_eq!(ScenarioTag::parse_loose("warp-core"), ScenarioTag::General);
        assert_eq!(ScenarioTag::parse_loose(""), ScenarioTag::General);
        assert_eq!(ScenarioTag::parse_loose("Work "), ScenarioTag::Work);
    }

    #[test]
    fn tone_accepts_original_wire_spellings() {
        assert_eq!(ToneTag::parse_loose("xhsStyle"), ToneTag::XhsStyle);
        assert_eq!(ToneTag::parse_loose("strong"), ToneTag::Default);
        assert_eq!(ToneTag::parse_loose("nonsense"), ToneTag::Default);
    }

    #[test]
    fn scenario_deserializes_from_json_strings() {
        let tag: ScenarioTag = serde_json::from_str("\"consumer\"").unwrap();
        assert_eq!(tag, ScenarioTag::Consumer);
        let tag: ScenarioTag = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(tag, ScenarioTag::General);
    }

    #[test]
    fn emergency_shares_general_templates() {
        assert_eq!(ScenarioTag::Emergency.template_key(), "general");
        assert!(scenario_info(ScenarioTag::Emergency).is_some());
    }

    #[test]
    fn catalog_covers_all_intake_scenarios() {
        // Every non-general tag has an intake card.
        for tag in ALL_SCENARIOS {
            if *tag == ScenarioTag::General {
                continue;
            }
            assert!(scenario_info(*tag).is_some(), "missing card for {tag}");
        }
    }
}
