//! Integration tests for the semantics layer
//!
//! Tests the path: text → EmotionClassifier → IncongruenceDetector

use lumira::core::{EmotionClassifier, IncongruenceDetector};
use lumira::types::{Emotion, IntegrityKind, Language};
use pretty_assertions::assert_eq;

const SAMPLES: &[&str] = &[
    "",
    "The meeting is at three.",
    "I am so happy and grateful today!",
    "I'm terrified and angry, this is disgusting",
    "Ik ben zo blij en trots vandaag",
    "Ik ben bang en verdrietig",
    "I will never be happy again",
    "happy happy happy happy",
    "Looking forward to the weekend, but also nervous",
];

/// Every score is a known label within [0, 1]
#[test]
fn test_scores_are_bounded_and_closed() {
    let classifier = EmotionClassifier::new();
    for text in SAMPLES {
        for score in classifier.classify(text) {
            assert!(Emotion::ALL.contains(&score.name));
            assert!(score.score > 0.0 && score.score <= 1.0, "{:?} on {:?}", score, text);
        }
    }
}

/// Scores come out highest first
#[test]
fn test_scores_sorted_descending() {
    let classifier = EmotionClassifier::new();
    for text in SAMPLES {
        let scores = classifier.classify(text);
        for pair in scores.windows(2) {
            assert!(pair[0].score >= pair[1].score, "unsorted on {:?}", text);
        }
    }
}

/// Same input, same output
#[test]
fn test_classify_and_detect_are_idempotent() {
    let classifier = EmotionClassifier::new();
    let detector = IncongruenceDetector::new();
    for text in SAMPLES {
        let a = classifier.classify(text);
        let b = classifier.classify(text);
        assert_eq!(a, b);
        assert_eq!(detector.detect(text, &a), detector.detect(text, &b));
    }
}

/// Neutral text scores nothing
#[test]
fn test_neutral_text_has_no_emotion() {
    let classifier = EmotionClassifier::new();
    assert!(classifier.classify("The meeting is at three.").is_empty());
    assert!(classifier.classify("").is_empty());
}

/// Dutch keywords register as Dutch hits
#[test]
fn test_dutch_detailed_analysis() {
    let analysis = EmotionClassifier::new().classify_detailed("Ik ben bang en verdrietig");
    assert!(analysis.language_hits.dutch >= 2);
    assert_eq!(analysis.language_hits.english, 0);
    assert!(analysis.hits.iter().all(|h| h.language == Language::Dutch));

    let labels: Vec<Emotion> = analysis.scores.iter().map(|s| s.name).collect();
    assert!(labels.contains(&Emotion::Fear));
    assert!(labels.contains(&Emotion::Sadness));
}

/// Full semantics path on a negated future
#[test]
fn test_full_semantics_path() {
    let text = "I will never be happy again";
    let emotions = EmotionClassifier::new().classify(text);
    assert_eq!(emotions[0].name, Emotion::Joy);

    let signals = IncongruenceDetector::new().detect(text, &emotions);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].kind, IntegrityKind::FutureNegationMismatch);
    assert!(signals[0].confidence > 0.5 && signals[0].confidence <= 1.0);
    assert!(text[signals[0].span.start..signals[0].span.end].ends_with("happy"));
}

/// Positive framing without negation stays quiet
#[test]
fn test_no_incongruence_on_plain_future() {
    let text = "I will be happy when summer comes";
    let emotions = EmotionClassifier::new().classify(text);
    let signals = IncongruenceDetector::new().detect(text, &emotions);
    assert!(signals.iter().all(|s| s.kind != IntegrityKind::FutureNegationMismatch));
}
