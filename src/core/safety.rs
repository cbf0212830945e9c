//! Safety scanner
//!
//! Rule-based detection of self-harm, suicide intent and self-hate language
//! in English and Dutch. Each rule carries a severity; overlapping matches of
//! one kind collapse to the most severe, and co-occurring severe flags add a
//! synthesized escalation flag. Excerpts are bounded so raw text never leaks
//! wholesale into reports.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::types::{RiskFlag, RiskKind, SafetySummary, Severity};
use crate::{ESCALATION_MIN_SEVERE, EXCERPT_CONTEXT_CHARS, EXCERPT_MAX_CHARS};

/// Pattern id used for synthesized escalation flags
pub const ESCALATION_PATTERN: &str = "escalation.co-occurrence";

/// (pattern id, kind, severity, regex source); compiled case-insensitive
const RULE_TABLE: &[(&str, RiskKind, Severity, &str)] = &[
    // Self-harm
    (
        "self-harm.self-destructive",
        RiskKind::SelfHarm,
        Severity::Low,
        r"\bself[- ]?(?:destructive|sabotag\w*)\b|\bzelfdestructief\b",
    ),
    (
        "self-harm.hurt-myself",
        RiskKind::SelfHarm,
        Severity::Medium,
        r"\b(?:hurt|harm|injure|punish)\s+myself\b|\bself[- ]?harm(?:ing)?\b|\bmezelf\s+pijn\s+(?:doen|te\s+doen)\b|\bzelfbeschadiging\b",
    ),
    (
        "self-harm.cut-myself",
        RiskKind::SelfHarm,
        Severity::High,
        r"\b(?:cut|cutting|burn|burning)\s+myself\b|\bmezelf\s+(?:snijden|branden)\b|\bsnij\s+mezelf\b",
    ),
    // Suicide intent
    (
        "suicide.passive",
        RiskKind::SuicideIntent,
        Severity::Low,
        r"\bdisappear\s+forever\b|\bnot\s+(?:be\s+)?here\s+anymore\b|\bworld\s+without\s+me\b|\bwereld\s+zonder\s+mij\b|\bvoor\s+altijd\s+verdwijnen\b",
    ),
    (
        "suicide.hopeless",
        RiskKind::SuicideIntent,
        Severity::Medium,
        r"\bgive\s+up\s+on\s+life\b|\bnothing\s+(?:left\s+)?to\s+live\s+for\b|\bbetter\s+off\s+dead\b|\bwish\s+i\s+(?:was|were)\s+dead\b|\bgeen\s+zin\s+meer\s+in\s+(?:het\s+)?leven\b",
    ),
    (
        "suicide.explicit",
        RiskKind::SuicideIntent,
        Severity::High,
        r"\b(?:kill\s+myself|end\s+my\s+life|want\s+to\s+die|take\s+my\s+own\s+life|suicid(?:e|al)|zelfmoord|niet\s+meer\s+(?:willen\s+)?leven|dood\s+willen)\b",
    ),
    (
        "suicide.plan",
        RiskKind::SuicideIntent,
        Severity::Critical,
        r"\b(?:plan|planning|plans|tonight|today|method|note|letter|vanavond|vandaag|afscheidsbrief)\b.{0,60}\b(?:kill\s+myself|end\s+my\s+life|suicide|to\s+die|zelfmoord)\b|\b(?:kill\s+myself|end\s+my\s+life|zelfmoord\s+plegen)\b.{0,30}\b(?:tonight|today|tomorrow|vanavond|vandaag|morgen)\b",
    ),
    // Self-hate
    (
        "self-hate.worthless",
        RiskKind::SelfHate,
        Severity::Low,
        r"\b(?:i\s+am|i['’]m|i\s+feel)\s+(?:so\s+|such\s+|completely\s+)?(?:a\s+)?(?:worthless|useless|pathetic|failure|burden)\b|\bik\s+ben\s+(?:zo\s+|een\s+)?(?:waardeloos|nutteloos|mislukking|last)\b",
    ),
    (
        "self-hate.hate-myself",
        RiskKind::SelfHate,
        Severity::Medium,
        r"\b(?:hate|despise|loathe)\s+myself\b|\bdisgusted\s+(?:with|by)\s+myself\b|\b(?:haat|veracht)\s+(?:mezelf|mijzelf)\b",
    ),
    (
        "self-hate.deserve-suffering",
        RiskKind::SelfHate,
        Severity::High,
        r"\bbetter\s+off\s+without\s+me\b|\bdeserve\s+to\s+suffer\b|\bbeter\s+(?:af\s+)?zonder\s+mij\b|\bverdien\s+het\s+om\s+te\s+lijden\b",
    ),
];

struct Rule {
    id: &'static str,
    kind: RiskKind,
    severity: Severity,
    regex: Regex,
}

lazy_static! {
    static ref RULES: Vec<Rule> = RULE_TABLE.iter()
        .map(|&(id, kind, severity, source)| Rule {
            id,
            kind,
            severity,
            regex: Regex::new(&format!("(?i){}", source)).unwrap(),
        })
        .collect();
}

/// A rule match before conversion to a flag
struct Candidate {
    id: &'static str,
    kind: RiskKind,
    severity: Severity,
    start: usize,
    end: usize,
}

impl Candidate {
    fn overlaps(&self, other: &Candidate) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Safety scanner
#[derive(Debug, Default)]
pub struct SafetyScanner;

impl SafetyScanner {
    /// Create new scanner
    pub fn new() -> Self {
        Self
    }

    /// Scan text for risk language
    pub fn scan(&self, text: &str) -> Vec<RiskFlag> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut matched: Vec<Candidate> = RULES.iter()
            .flat_map(|rule| {
                rule.regex.find_iter(text).map(move |m| Candidate {
                    id: rule.id,
                    kind: rule.kind,
                    severity: rule.severity,
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect();

        // Most severe first so overlap resolution keeps the higher severity;
        // earlier spans first within a severity
        matched.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.start.cmp(&b.start)));

        let mut surviving: Vec<Candidate> = Vec::new();
        for candidate in matched {
            let shadowed = surviving.iter()
                .any(|k| k.kind == candidate.kind && k.overlaps(&candidate));
            if !shadowed {
                surviving.push(candidate);
            }
        }

        // One flag per rule: its earliest surviving span
        let mut kept: Vec<Candidate> = Vec::new();
        for candidate in surviving {
            match kept.iter_mut().find(|k| k.id == candidate.id) {
                Some(existing) if candidate.start < existing.start => *existing = candidate,
                Some(_) => {}
                None => kept.push(candidate),
            }
        }

        let severe: Vec<&Candidate> = kept.iter()
            .filter(|c| c.severity.is_severe())
            .collect();

        if severe.len() >= ESCALATION_MIN_SEVERE {
            let start = severe.iter().map(|c| c.start).min().unwrap_or(0);
            let end = severe.iter().map(|c| c.end).max().unwrap_or(0);
            kept.push(Candidate {
                id: ESCALATION_PATTERN,
                kind: RiskKind::Escalation,
                severity: Severity::Critical,
                start,
                end,
            });
        }

        kept.sort_by(|a, b| {
            b.severity.cmp(&a.severity)
                .then(a.kind.cmp(&b.kind))
                .then(a.start.cmp(&b.start))
        });

        debug!(flags = kept.len(), "safety scan complete");

        kept.into_iter()
            .map(|c| RiskFlag {
                kind: c.kind,
                severity: c.severity,
                excerpt: excerpt_around(text, c.start, c.end),
                matched_pattern: c.id.to_string(),
            })
            .collect()
    }
}

/// Restore ordering and escalation after flags from another source were
/// appended to a scan result. Merged flags carry no span, so a synthesized
/// escalation borrows the excerpts of the severe flags.
pub(crate) fn reconcile_flags(mut flags: Vec<RiskFlag>) -> Vec<RiskFlag> {
    let escalated = flags.iter().any(|f| f.kind == RiskKind::Escalation);
    let severe: Vec<&RiskFlag> = flags.iter()
        .filter(|f| f.kind != RiskKind::Escalation && f.severity.is_severe())
        .collect();

    if !escalated && severe.len() >= ESCALATION_MIN_SEVERE {
        let joined = severe.iter()
            .map(|f| f.excerpt.as_str())
            .collect::<Vec<_>>()
            .join(" … ");
        flags.push(RiskFlag {
            kind: RiskKind::Escalation,
            severity: Severity::Critical,
            excerpt: truncate_chars(&joined),
            matched_pattern: ESCALATION_PATTERN.to_string(),
        });
    }

    // Stable: equal severity and kind keep their existing order
    flags.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.kind.cmp(&b.kind)));
    flags
}

/// Aggregate counts over a set of flags
pub fn summarize(flags: &[RiskFlag]) -> SafetySummary {
    let mut by_kind = BTreeMap::new();
    let mut by_severity = BTreeMap::new();

    for flag in flags {
        *by_kind.entry(flag.kind).or_insert(0) += 1;
        *by_severity.entry(flag.severity).or_insert(0) += 1;
    }

    SafetySummary {
        total: flags.len(),
        highest: flags.iter().map(|f| f.severity).max(),
        by_kind,
        by_severity,
    }
}

/// Bounded excerpt around a byte range of `text`.
///
/// Keeps up to `EXCERPT_CONTEXT_CHARS` on each side, marks cut edges with '…',
/// and never exceeds `EXCERPT_MAX_CHARS` characters.
pub fn excerpt_around(text: &str, start: usize, end: usize) -> String {
    let matched = &text[start..end];
    let match_chars = matched.chars().count();

    if match_chars + 2 >= EXCERPT_MAX_CHARS {
        return single_line(&truncate_chars(matched));
    }

    let context = EXCERPT_CONTEXT_CHARS.min((EXCERPT_MAX_CHARS - match_chars - 2) / 2);

    let lead = text[..start].char_indices()
        .rev()
        .take(context)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let trail = text[end..].char_indices()
        .nth(context)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let mut excerpt = String::new();
    if lead > 0 {
        excerpt.push('…');
    }
    excerpt.push_str(&text[lead..trail]);
    if trail < text.len() {
        excerpt.push('…');
    }

    single_line(&excerpt)
}

/// Cut a string to at most `EXCERPT_MAX_CHARS` characters
pub(crate) fn truncate_chars(s: &str) -> String {
    match s.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((i, _)) => s[..i].to_string(),
        None => s.to_string(),
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

// =============================================================================
// TESTS
// =============================================================================
