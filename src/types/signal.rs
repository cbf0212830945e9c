//! Persisted signal records
//!
//! A SignalRecord is the reduced, storable projection of an AnalysisReport.
//! Verbatim excerpts are replaced by a short digest before they reach disk.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{AnalysisReport, Emotion, EmotionScore, RiskKind, Severity, TextSample};
use crate::{EXCERPT_DIGEST_LEN, SIGNAL_RECORD_VERSION};

/// Stored form of a risk flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRisk {
    pub kind: RiskKind,
    pub severity: Severity,
    /// Truncated SHA-256 of the excerpt, for de-duplication without exposure
    pub excerpt_digest: String,
}

/// One line of the signal store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Format version
    pub v: u8,
    pub timestamp: DateTime<Utc>,
    pub sample_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant: Option<Emotion>,
    #[serde(default)]
    pub emotions: Vec<EmotionScore>,
    #[serde(default)]
    pub risks: Vec<StoredRisk>,
    #[serde(default)]
    pub integrity_count: usize,
}

impl SignalRecord {
    /// Minimal record, mostly for tests and synthetic data
    pub fn new(sample_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            v: SIGNAL_RECORD_VERSION,
            timestamp,
            sample_id: sample_id.into(),
            source: String::new(),
            dominant: None,
            emotions: Vec::new(),
            risks: Vec::new(),
            integrity_count: 0,
        }
    }

    /// Derive the stored projection of a report
    pub fn from_report(sample: &TextSample, report: &AnalysisReport) -> Self {
        Self {
            v: SIGNAL_RECORD_VERSION,
            timestamp: sample.timestamp,
            sample_id: report.sample_id.clone(),
            source: sample.source.clone(),
            dominant: report.emotions.first().map(|e| e.name),
            emotions: report.emotions.clone(),
            risks: report.risks.iter()
                .map(|r| StoredRisk {
                    kind: r.kind,
                    severity: r.severity,
                    excerpt_digest: excerpt_digest(&r.excerpt),
                })
                .collect(),
            integrity_count: report.integrity.len(),
        }
    }

    /// Add an emotion score (builder style)
    pub fn with_emotion(mut self, name: Emotion, score: f64) -> Self {
        self.emotions.push(EmotionScore::new(name, score));
        if self.dominant.is_none() {
            self.dominant = Some(name);
        }
        self
    }

    /// Add a risk (builder style)
    pub fn with_risk(mut self, kind: RiskKind, severity: Severity) -> Self {
        self.risks.push(StoredRisk {
            kind,
            severity,
            excerpt_digest: String::new(),
        });
        self
    }

    /// Score for one label, 0.0 when absent
    pub fn score_of(&self, emotion: Emotion) -> f64 {
        self.emotions.iter()
            .filter(|e| e.name == emotion)
            .map(|e| e.score)
            .fold(0.0, f64::max)
    }

    pub fn has_risk(&self) -> bool {
        !self.risks.is_empty()
    }
}

/// Summary counts over the whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub path: PathBuf,
    pub total_records: usize,
    /// Malformed or torn lines that were skipped
    pub skipped_lines: usize,
    pub records_with_risk: usize,
    pub risks_by_kind: BTreeMap<RiskKind, usize>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

/// Truncated hex SHA-256 of an excerpt
pub(crate) fn excerpt_digest(excerpt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(excerpt.as_bytes());
    let hash = hasher.finalize();
    let hex: String = hash.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..EXCERPT_DIGEST_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskFlag;

    #[test]
    fn test_from_report_redacts_excerpt() {
        let sample = TextSample::new("s1", "test", "I want to hurt myself");
        let mut report = AnalysisReport::empty("s1");
        report.emotions.push(EmotionScore::new(Emotion::Sadness, 0.4));
        report.risks.push(RiskFlag {
            kind: RiskKind::SelfHarm,
            severity: Severity::Medium,
            excerpt: "I want to hurt myself".to_string(),
            matched_pattern: "self-harm.hurt-myself".to_string(),
        });

        let record = SignalRecord::from_report(&sample, &report);
        let line = serde_json::to_string(&record).unwrap();

        assert_eq!(record.dominant, Some(Emotion::Sadness));
        assert_eq!(record.risks[0].excerpt_digest.len(), EXCERPT_DIGEST_LEN);
        assert!(!line.contains("hurt myself"), "Excerpt must not be persisted verbatim");
    }

    #[test]
    fn test_score_of_absent_is_zero() {
        let record = SignalRecord::new("s1", Utc::now()).with_emotion(Emotion::Joy, 0.5);
        assert_eq!(record.score_of(Emotion::Joy), 0.5);
        assert_eq!(record.score_of(Emotion::Fear), 0.0);
    }
}
