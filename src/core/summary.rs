//! Window summaries and report rendering
//!
//! Aggregates stored records into a WindowSummary and renders it as
//! Markdown or JSON. Only stored projections are used, so no raw text can
//! appear in a rendered report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::core::store::window_start;
use crate::core::trend::analyze_records;
use crate::types::{Emotion, RiskHighlight, SignalRecord, WindowSummary};
use crate::ADVISORY_NOTICE;

/// Maximum number of labels in `top_emotions`
const TOP_EMOTIONS: usize = 5;

/// Maximum number of recent risk highlights
const RECENT_RISKS: usize = 10;

/// Aggregate records already filtered to the window ending at `to`
pub fn summarize_records(records: &[SignalRecord], window_days: u32, to: DateTime<Utc>) -> WindowSummary {
    let count = records.len();
    let average = |e: Emotion| {
        if count == 0 {
            0.0
        } else {
            records.iter().map(|r| r.score_of(e)).sum::<f64>() / count as f64
        }
    };

    let mut top_emotions: Vec<(Emotion, f64)> = Emotion::ALL.iter()
        .map(|&e| (e, average(e)))
        .filter(|(_, avg)| *avg > 0.0)
        .collect();
    top_emotions.sort_by(|a, b| b.1.total_cmp(&a.1));
    top_emotions.truncate(TOP_EMOTIONS);

    let mut risk_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    for risk in records.iter().flat_map(|r| &r.risks) {
        *risk_breakdown.entry(format!("{}:{}", risk.kind, risk.severity)).or_insert(0) += 1;
    }

    let mut newest_first: Vec<&SignalRecord> = records.iter().filter(|r| r.has_risk()).collect();
    newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let recent_risks: Vec<RiskHighlight> = newest_first.iter()
        .flat_map(|r| {
            r.risks.iter().map(move |risk| RiskHighlight {
                timestamp: r.timestamp,
                sample_id: r.sample_id.clone(),
                kind: risk.kind,
                severity: risk.severity,
            })
        })
        .take(RECENT_RISKS)
        .collect();

    let trend = analyze_records(records, window_days);

    WindowSummary {
        window_days,
        from: window_start(to, window_days),
        to,
        record_count: count,
        records_with_risk: records.iter().filter(|r| r.has_risk()).count(),
        integrity_signals: records.iter().map(|r| r.integrity_count).sum(),
        joy_average: average(Emotion::Joy),
        top_emotions,
        risk_breakdown,
        recent_risks,
        downhill_alert: trend.as_ref().is_some_and(|t| t.downhill_alert),
        trend: trend.map(|t| t.reason),
    }
}

/// Render a summary as Markdown
pub fn render_markdown(summary: &WindowSummary) -> String {
    let mut lines = Vec::new();

    lines.push(format!("# LUMIRA Report: last {} days", summary.window_days));
    lines.push(format!(
        "_From {} to {}_",
        summary.from.format("%Y-%m-%d %H:%M UTC"),
        summary.to.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.push(String::new());

    lines.push("## Overview".to_string());
    lines.push(format!("- Records: {}", summary.record_count));
    lines.push(format!("- Records with risk: {}", summary.records_with_risk));
    lines.push(format!("- Incongruence signals: {}", summary.integrity_signals));
    lines.push(format!("- Average joy: {:.3}", summary.joy_average));
    lines.push(String::new());

    lines.push("## Top Emotions".to_string());
    if summary.top_emotions.is_empty() {
        lines.push("- none".to_string());
    }
    for (emotion, avg) in &summary.top_emotions {
        lines.push(format!("- {}: {:.3}", emotion, avg));
    }
    lines.push(String::new());

    lines.push("## Risk Breakdown".to_string());
    if summary.risk_breakdown.is_empty() {
        lines.push("- none".to_string());
    }
    let mut breakdown: Vec<(&String, &usize)> = summary.risk_breakdown.iter().collect();
    breakdown.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (key, n) in breakdown {
        lines.push(format!("- {}: {}", key, n));
    }
    lines.push(String::new());

    lines.push("## Recent Risk Highlights".to_string());
    if summary.recent_risks.is_empty() {
        lines.push("- none".to_string());
    }
    for risk in &summary.recent_risks {
        lines.push(format!(
            "- {} {} [{}] ({})",
            risk.timestamp.format("%Y-%m-%d %H:%M"),
            risk.kind,
            risk.severity,
            risk.sample_id
        ));
    }
    lines.push(String::new());

    lines.push("## Trend".to_string());
    match summary.trend {
        Some(reason) if summary.downhill_alert => lines.push(format!("**ALERT** {}", reason)),
        Some(reason) => lines.push(reason.to_string()),
        None => lines.push("Not enough data for a trend.".to_string()),
    }
    lines.push(String::new());

    lines.push(format!("> {}", ADVISORY_NOTICE));

    lines.join("\n")
}

/// Render a summary as pretty JSON
pub fn render_json(summary: &WindowSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskKind, Severity};
    use chrono::Duration;

    fn fixture(now: DateTime<Utc>) -> Vec<SignalRecord> {
        vec![
            SignalRecord::new("a", now - Duration::days(3))
                .with_emotion(Emotion::Joy, 0.8)
                .with_emotion(Emotion::Trust, 0.2),
            SignalRecord::new("b", now - Duration::days(2)).with_emotion(Emotion::Joy, 0.6),
            SignalRecord::new("c", now - Duration::days(1))
                .with_emotion(Emotion::Sadness, 0.5)
                .with_risk(RiskKind::SelfHate, Severity::Low),
            SignalRecord::new("d", now)
                .with_emotion(Emotion::Sadness, 0.7)
                .with_risk(RiskKind::SelfHarm, Severity::Medium),
        ]
    }

    #[test]
    fn test_summarize_records() {
        let now = Utc::now();
        let summary = summarize_records(&fixture(now), 7, now);

        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.records_with_risk, 2);
        assert!((summary.joy_average - 0.35).abs() < 1e-9);
        assert_eq!(summary.top_emotions[0].0, Emotion::Joy);
        assert_eq!(summary.top_emotions.len(), 3);
        assert_eq!(summary.risk_breakdown.get("self-hate:low"), Some(&1));
        assert_eq!(summary.recent_risks[0].sample_id, "d");
        assert_eq!(summary.trend, Some(crate::types::TrendReason::R020_DOWNHILL));
        assert!(summary.downhill_alert);
        assert_eq!(summary.from, now - Duration::days(7));
    }

    #[test]
    fn test_empty_summary() {
        let now = Utc::now();
        let summary = summarize_records(&[], 7, now);
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.joy_average, 0.0);
        assert!(summary.top_emotions.is_empty());
        assert_eq!(summary.trend, None);
        assert!(!summary.downhill_alert);
    }

    #[test]
    fn test_unbounded_window_renders() {
        let now = Utc::now();
        let summary = summarize_records(&fixture(now), u32::MAX, now);
        assert_eq!(summary.from, DateTime::<Utc>::MIN_UTC);
        assert!(render_markdown(&summary).contains(&format!("last {} days", u32::MAX)));
    }

    #[test]
    fn test_markdown_has_sections_and_notice() {
        let now = Utc::now();
        let md = render_markdown(&summarize_records(&fixture(now), 7, now));
        assert!(md.starts_with("# LUMIRA Report: last 7 days"));
        assert!(md.contains("## Risk Breakdown"));
        assert!(md.contains("- self-harm:medium: 1"));
        assert!(md.contains("**ALERT** R020_DOWNHILL"));
        assert!(md.ends_with(ADVISORY_NOTICE));
    }

    #[test]
    fn test_json_output() {
        let now = Utc::now();
        let summary = summarize_records(&fixture(now), 7, now);
        let json = render_json(&summary).unwrap();
        assert!(json.contains("\"record_count\": 4"));
        assert!(json.contains("\"trend\": \"R020_DOWNHILL\""));
        let back: WindowSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recent_risks, summary.recent_risks);
    }
}
