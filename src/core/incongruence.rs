//! Incongruence detector
//!
//! Flags emotion words framed by a negated future ("I will never be happy",
//! "ik zal nooit gelukkig zijn") and opposing emotions that are both strongly
//! present. Works from the text plus already-computed scores; nothing is
//! re-scored here.

use std::collections::BTreeMap;

use crate::core::lexicon::{locate_hits, tokenize, Token};
use crate::core::safety::truncate_chars;
use crate::types::{Emotion, EmotionHit, EmotionScore, IntegrityKind, IntegritySignal, TextSpan, Valence};
use crate::{CONFLICT_MIN_SCORE, INCONGRUENCE_MIN_CONFIDENCE, INCONGRUENCE_WINDOW, NON_POSITIVE_VALENCE_DAMPING};

/// Future-tense markers (EN + NL)
const FUTURE_MARKERS: &[&str] = &[
    "will", "shall", "gonna", "won't", "shan't", "tomorrow", "soon", "someday",
    "zal", "zullen", "zult", "ga", "gaat", "gaan", "morgen", "straks", "binnenkort", "ooit",
];

/// Negation markers (EN + NL)
const NEGATION_MARKERS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "none", "nowhere", "neither", "nor",
    "cannot", "without",
    "niet", "nooit", "geen", "niets", "niemand", "nergens", "zonder",
];

/// Emotion pairs that contradict each other
const CONFLICTING_PAIRS: &[(Emotion, Emotion)] = &[
    (Emotion::Joy, Emotion::Sadness),
    (Emotion::Love, Emotion::Contempt),
    (Emotion::Trust, Emotion::Fear),
    (Emotion::Pride, Emotion::Shame),
    (Emotion::Anticipation, Emotion::Fear),
];

/// Characters that end a clause; markers never reach across them
const CLAUSE_BREAKS: &[char] = &['.', '!', '?', ';', '\n'];

fn is_future(tokens: &[Token], i: usize) -> bool {
    let word = tokens[i].text.as_str();
    FUTURE_MARKERS.contains(&word)
        || word.ends_with("'ll")
        || (word == "going" && tokens.get(i + 1).is_some_and(|t| t.text == "to"))
}

fn is_negation(word: &str) -> bool {
    NEGATION_MARKERS.contains(&word) || word.ends_with("n't")
}

/// Incongruence detector
#[derive(Debug, Default)]
pub struct IncongruenceDetector;

impl IncongruenceDetector {
    /// Create new detector
    pub fn new() -> Self {
        Self
    }

    /// Detect incongruence given the text and its emotion scores
    pub fn detect(&self, text: &str, emotions: &[EmotionScore]) -> Vec<IntegritySignal> {
        if emotions.is_empty() {
            return Vec::new();
        }

        let tokens = tokenize(text);
        let present = |e: Emotion| emotions.iter().any(|s| s.name == e && s.score > 0.0);
        let hits = locate_hits(&tokens, present);

        let mut signals = self.future_negation(text, &tokens, &hits);
        signals.extend(self.conflicting(text, emotions, &hits));
        signals
    }

    /// One signal per emotion occurrence preceded by future + negation markers
    fn future_negation(&self, text: &str, tokens: &[Token], hits: &[EmotionHit]) -> Vec<IntegritySignal> {
        // One anchor per token span; prefer positive valence when labels share a word
        let mut anchors: BTreeMap<(usize, usize), &EmotionHit> = BTreeMap::new();
        for hit in hits {
            anchors.entry((hit.token_index, hit.token_len))
                .and_modify(|current| {
                    if current.emotion.valence() != Valence::Positive
                        && hit.emotion.valence() == Valence::Positive
                    {
                        *current = hit;
                    }
                })
                .or_insert(hit);
        }

        let mut signals = Vec::new();

        for hit in anchors.values() {
            let e = hit.token_index;
            let from = e.saturating_sub(INCONGRUENCE_WINDOW);

            let future = (from..e).rev().find(|&i| is_future(tokens, i));
            let negation = (from..e).rev().find(|&i| is_negation(&tokens[i].text));
            let (Some(f), Some(n)) = (future, negation) else {
                continue;
            };

            let earliest = f.min(n);
            let start = tokens[earliest].start;
            if text[tokens[earliest].end..hit.start].contains(CLAUSE_BREAKS) {
                continue;
            }

            let spread = (e - earliest) as f64;
            let mut confidence = 1.0 - (spread - 1.0) / (2.0 * INCONGRUENCE_WINDOW as f64);

            let kind = if hit.emotion.valence() == Valence::Positive {
                IntegrityKind::FutureNegationMismatch
            } else {
                confidence *= NON_POSITIVE_VALENCE_DAMPING;
                IntegrityKind::FutureNegationAffect
            };

            signals.push(IntegritySignal {
                kind,
                confidence: confidence.clamp(INCONGRUENCE_MIN_CONFIDENCE * NON_POSITIVE_VALENCE_DAMPING, 1.0),
                span: TextSpan {
                    start,
                    end: hit.end,
                    snippet: truncate_chars(&text[start..hit.end]),
                },
                emotion: Some(hit.emotion),
            });
        }

        signals
    }

    /// Opposing emotions both above the conflict threshold
    fn conflicting(&self, text: &str, emotions: &[EmotionScore], hits: &[EmotionHit]) -> Vec<IntegritySignal> {
        let score = |e: Emotion| {
            emotions.iter()
                .filter(|s| s.name == e)
                .map(|s| s.score)
                .fold(0.0, f64::max)
        };

        let mut signals = Vec::new();

        for &(a, b) in CONFLICTING_PAIRS {
            let (sa, sb) = (score(a), score(b));
            if sa < CONFLICT_MIN_SCORE || sb < CONFLICT_MIN_SCORE {
                continue;
            }

            let pair_hits = hits.iter().filter(|h| h.emotion == a || h.emotion == b);
            let start = pair_hits.clone().map(|h| h.start).min().unwrap_or(0);
            let end = pair_hits.map(|h| h.end).max().unwrap_or(0);

            signals.push(IntegritySignal {
                kind: IntegrityKind::ConflictingEmotions,
                confidence: sa.min(sb) / sa.max(sb),
                span: TextSpan {
                    start,
                    end,
                    snippet: truncate_chars(&text[start..end]),
                },
                emotion: Some(a),
            });
        }

        signals
    }
}

// =============================================================================
// TESTS
// =============================================================================
