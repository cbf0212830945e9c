//! Analysis report returned for every processed sample

use serde::{Deserialize, Serialize};

use crate::types::{EmotionScore, IntegritySignal, RiskFlag};

/// Pipeline layer a diagnostic comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Semantics,
    Safety,
    Signals,
    Legacy,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Layer::Semantics => "semantics",
            Layer::Safety => "safety",
            Layer::Signals => "signals",
            Layer::Legacy => "legacy",
        };
        write!(f, "{}", name)
    }
}

/// Non-fatal problem encountered while building a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub layer: Layer,
    pub message: String,
}

impl Diagnostic {
    pub fn new(layer: Layer, message: impl Into<String>) -> Self {
        Self {
            layer,
            message: message.into(),
        }
    }
}

/// Unified result for one sample. Shape is stable regardless of flags:
/// disabled layers leave their sequence empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub sample_id: String,
    pub emotions: Vec<EmotionScore>,
    pub integrity: Vec<IntegritySignal>,
    pub risks: Vec<RiskFlag>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    /// Report with every sequence empty
    pub fn empty(sample_id: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            emotions: Vec::new(),
            integrity: Vec::new(),
            risks: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty() && self.integrity.is_empty() && self.risks.is_empty()
    }

    pub fn has_risk(&self) -> bool {
        !self.risks.is_empty()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let emotions = self.emotions.iter()
            .map(|e| format!("{}={:.3}", e.name, e.score))
            .collect::<Vec<_>>()
            .join(",");
        let risks = self.risks.iter()
            .map(|r| format!("{}:{}", r.kind, r.severity))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "sample={} | emotions=[{}] | integrity={} | risks=[{}] | diagnostics={}",
            self.sample_id,
            emotions,
            self.integrity.len(),
            risks,
            self.diagnostics.len()
        )
    }
}

/// Which layers an engine was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStatus {
    pub lumira_enabled: bool,
    pub semantics_enabled: bool,
    pub safety_enabled: bool,
    pub signals_enabled: bool,
    pub legacy_adapter: bool,
}
