//! Integration tests for the safety layer
//!
//! Tests the path: text → SafetyScanner → RiskFlag / SafetySummary

use lumira::core::{summarize, SafetyScanner, ESCALATION_PATTERN};
use lumira::types::{RiskKind, Severity};
use lumira::EXCERPT_MAX_CHARS;

/// A self-harm phrase buried in long text yields exactly one bounded flag
#[test]
fn test_self_harm_trigger_in_long_text() {
    let before = "Work was long and the train was late again, so I sat on the platform for an hour. ";
    let after = " Then I went home, made some tea and tried to sleep but the thoughts kept coming back.";
    let text = format!("{}Honestly I want to hurt myself.{}", before, after);
    assert!(text.chars().count() > EXCERPT_MAX_CHARS);

    let flags = SafetyScanner::new().scan(&text);
    let self_harm: Vec<_> = flags.iter().filter(|f| f.kind == RiskKind::SelfHarm).collect();

    assert_eq!(self_harm.len(), 1);
    let flag = self_harm[0];
    assert!(flag.severity >= Severity::Medium);
    assert!(flag.excerpt.contains("hurt myself"));
    assert!(flag.excerpt.chars().count() <= EXCERPT_MAX_CHARS);
    assert!(flag.excerpt.chars().count() < text.chars().count());
}

/// Excerpts never exceed the cap, whatever the input
#[test]
fn test_excerpts_always_bounded() {
    let scanner = SafetyScanner::new();
    let inputs = [
        "kill myself ".repeat(50),
        format!("{}I hate myself{}", "ä".repeat(300), "ö".repeat(300)),
        format!("tonight {} kill myself", "x".repeat(40)),
        "I want to die and I keep cutting myself and I hate myself".to_string(),
    ];
    for text in &inputs {
        for flag in scanner.scan(text) {
            assert!(flag.excerpt.chars().count() <= EXCERPT_MAX_CHARS, "{:?}", flag);
        }
    }
}

/// Scanning is deterministic
#[test]
fn test_scan_idempotent() {
    let scanner = SafetyScanner::new();
    let text = "I'm so worthless. I want to die. Ik haat mezelf.";
    assert_eq!(scanner.scan(text), scanner.scan(text));
}

/// Plans raise the severity to critical
#[test]
fn test_plan_is_critical() {
    let flags = SafetyScanner::new().scan("I wrote a note, I'm going to end my life");
    assert_eq!(flags[0].kind, RiskKind::SuicideIntent);
    assert_eq!(flags[0].severity, Severity::Critical);
}

/// Two severe kinds produce an escalation ranked first
#[test]
fn test_escalation_ranked_first() {
    let flags = SafetyScanner::new().scan("Everyone is better off without me and I want to die");
    assert_eq!(flags[0].kind, RiskKind::Escalation);
    assert_eq!(flags[0].matched_pattern, ESCALATION_PATTERN);
    assert!(flags[0].excerpt.contains("better off without me"));
    assert!(flags[0].excerpt.contains("want to die"));

    let summary = summarize(&flags);
    assert_eq!(summary.highest, Some(Severity::Critical));
    assert_eq!(summary.by_kind.get(&RiskKind::SelfHate), Some(&1));
    assert_eq!(summary.by_kind.get(&RiskKind::SuicideIntent), Some(&1));
}

/// Ordering: severity descending, then kind
#[test]
fn test_flag_ordering() {
    let flags = SafetyScanner::new().scan("I feel so useless. I want to hurt myself. I hate myself.");
    for pair in flags.windows(2) {
        assert!(
            pair[0].severity > pair[1].severity
                || (pair[0].severity == pair[1].severity && pair[0].kind <= pair[1].kind)
        );
    }
}

/// Ordinary text stays clean
#[test]
fn test_no_false_positive_on_benign_text() {
    let scanner = SafetyScanner::new();
    for text in [
        "I cut the bread and burned the toast",
        "The plan for today is to finish the report",
        "She said the movie was killing it",
        "Ik ben blij met mijn nieuwe baan",
    ] {
        assert!(scanner.scan(text).is_empty(), "flagged: {}", text);
    }
}
