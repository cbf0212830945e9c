//! Window summary for human-facing reports

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Emotion, RiskKind, Severity, TrendReason};

/// A recent risk, without any text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskHighlight {
    pub timestamp: DateTime<Utc>,
    pub sample_id: String,
    pub kind: RiskKind,
    pub severity: Severity,
}

/// Aggregate of stored signals over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub window_days: u32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub record_count: usize,
    pub records_with_risk: usize,
    pub integrity_signals: usize,
    pub joy_average: f64,
    /// Highest averages first, at most five
    pub top_emotions: Vec<(Emotion, f64)>,
    /// Keyed "kind:severity"
    pub risk_breakdown: BTreeMap<String, usize>,
    /// Most recent first
    pub recent_risks: Vec<RiskHighlight>,
    /// Trend outcome, when enough data exists
    pub trend: Option<TrendReason>,
    pub downhill_alert: bool,
}
