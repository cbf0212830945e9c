//! Emotion labels and scores

use serde::{Deserialize, Serialize};

/// The closed set of 12 emotion labels, in fixed tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Trust,
    Anticipation,
    Shame,
    Pride,
    Love,
    Contempt,
}

/// Emotional valence of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Valence {
    Positive,
    Neutral,
    Negative,
}

impl Emotion {
    /// All labels in fixed order
    pub const ALL: [Emotion; 12] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Disgust,
        Emotion::Trust,
        Emotion::Anticipation,
        Emotion::Shame,
        Emotion::Pride,
        Emotion::Love,
        Emotion::Contempt,
    ];

    /// Label string (as serialized)
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Disgust => "disgust",
            Emotion::Trust => "trust",
            Emotion::Anticipation => "anticipation",
            Emotion::Shame => "shame",
            Emotion::Pride => "pride",
            Emotion::Love => "love",
            Emotion::Contempt => "contempt",
        }
    }

    pub fn valence(&self) -> Valence {
        match self {
            Emotion::Joy
            | Emotion::Trust
            | Emotion::Anticipation
            | Emotion::Pride
            | Emotion::Love => Valence::Positive,
            Emotion::Surprise => Valence::Neutral,
            Emotion::Sadness
            | Emotion::Anger
            | Emotion::Fear
            | Emotion::Disgust
            | Emotion::Shame
            | Emotion::Contempt => Valence::Negative,
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Intensity for one emotion label (sparse: only emitted when > 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub name: Emotion,
    pub score: f64,
}

impl EmotionScore {
    pub fn new(name: Emotion, score: f64) -> Self {
        Self { name, score }
    }
}

/// Lexicon language of a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Dutch,
}

/// Debug info for language pattern matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageHits {
    pub english: u32,
    pub dutch: u32,
}

/// A single lexicon match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionHit {
    pub emotion: Emotion,
    /// Index of the first matched token
    pub token_index: usize,
    /// Number of tokens covered (phrases > 1)
    pub token_len: usize,
    /// Byte offsets into the original text
    pub start: usize,
    pub end: usize,
    pub language: Language,
    /// Weight after intensifier boost
    pub weight: f64,
}

/// Scores plus the hits behind them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub scores: Vec<EmotionScore>,
    pub hits: Vec<EmotionHit>,
    pub token_count: usize,
    pub language_hits: LanguageHits,
}

impl EmotionAnalysis {
    /// Highest-scoring label, if any
    pub fn dominant(&self) -> Option<Emotion> {
        self.scores.first().map(|s| s.name)
    }
}
