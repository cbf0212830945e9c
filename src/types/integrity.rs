//! Incongruence signals

use serde::{Deserialize, Serialize};

use crate::types::Emotion;

/// What kind of mismatch was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrityKind {
    /// Positive emotion framed by a negated future ("I will never be happy")
    FutureNegationMismatch,
    /// Negated future around a neutral or negative emotion
    FutureNegationAffect,
    /// Opposing emotions both strongly present
    ConflictingEmotions,
}

impl IntegrityKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FutureNegationMismatch => "future-negation-mismatch",
            Self::FutureNegationAffect => "future-negation-affect",
            Self::ConflictingEmotions => "conflicting-emotions",
        }
    }
}

impl std::fmt::Display for IntegrityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Region of the input a signal refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Byte offsets into the original text
    pub start: usize,
    pub end: usize,
    /// The covered text, bounded to the excerpt limit
    pub snippet: String,
}

/// One detected incongruence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegritySignal {
    pub kind: IntegrityKind,
    /// 0.0-1.0, closer markers give higher confidence
    pub confidence: f64,
    pub span: TextSpan,
    /// Emotion the signal is anchored on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}
