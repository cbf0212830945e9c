//! Safety risk flags
//!
//! Flags are heuristic pattern hits. They never imply a clinical judgment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskKind {
    SelfHarm,
    SuicideIntent,
    SelfHate,
    /// Synthesized when several severe flags co-occur
    Escalation,
}

impl RiskKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SelfHarm => "self-harm",
            Self::SuicideIntent => "suicide-intent",
            Self::SelfHate => "self-hate",
            Self::Escalation => "escalation",
        }
    }
}

impl std::fmt::Display for RiskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Ordered severity: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// High or critical
    pub fn is_severe(&self) -> bool {
        *self >= Severity::High
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One fired safety rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub kind: RiskKind,
    pub severity: Severity,
    /// Bounded region around the match (≤160 chars), never the full input
    pub excerpt: String,
    /// Identifier of the rule that fired
    pub matched_pattern: String,
}

/// Aggregate view of a set of flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySummary {
    pub total: usize,
    pub highest: Option<Severity>,
    pub by_kind: BTreeMap<RiskKind, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
}
