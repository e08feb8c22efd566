use rand::seq::SliceRandom;

use crate::templates::GenerationKind;

// Literal safety-net sentences. A masked failure must read like a
// plausible reply, never like an error banner.

pub const RESPONSE_FALLBACKS: [&str; 3] = [
    "抱歉，我现在无法生成回复，请稍后再试。",
    "这个问题很有趣，让我思考一下...",
    "我明白你的意思了，让我整理一下思路...",
];

pub const SUGGESTION_FALLBACKS: [&str; 3] = [
    "保持冷静，深呼吸，然后清晰地表达你的观点。",
    "尝试理解对方的立场，但也要坚持自己的底线。",
    "避免情绪化的回应，用事实和逻辑来支持你的观点。",
];

pub fn fallbacks_for(kind: GenerationKind) -> &'static [&'static str] {
    match kind {
        GenerationKind::Response => &RESPONSE_FALLBACKS,
        GenerationKind::Suggestion => &SUGGESTION_FALLBACKS,
    }
}

/// Uniformly sample one fallback sentence for the kind.
pub fn sample(kind: GenerationKind) -> &'static str {
    fallbacks_for(kind)
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(RESPONSE_FALLBACKS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stays_inside_the_known_set() {
        for _ in 0..32 {
            let text = sample(GenerationKind::Response);
            assert!(RESPONSE_FALLBACKS.contains(&text));
            let text = sample(GenerationKind::Suggestion);
            assert!(SUGGESTION_FALLBACKS.contains(&text));
        }
    }
}
