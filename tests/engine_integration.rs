//! Integration tests for the orchestration engine
//!
//! Tests the full path: TextSample → LumiraEngine → AnalysisReport → store → trend

use std::collections::HashMap;

use chrono::{Duration, Utc};
use lumira::config::{FeatureFlags, LumiraConfig, ENV_SAFETY_ENABLED, ENV_SEMANTICS_ENABLED};
use lumira::core::{LegacyOutput, LumiraEngine};
use lumira::error::{ConfigError, LegacyError};
use lumira::types::{Emotion, Layer, RiskKind, TextSample, TrendReason};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn engine_with(flags: FeatureFlags, dir: &TempDir) -> LumiraEngine {
    LumiraEngine::new(
        LumiraConfig::default()
            .with_flags(flags)
            .with_store_path(dir.path().join("db").join("signals.jsonl")),
    )
}

/// With every layer off the report is empty and nothing is written
#[test]
fn test_flag_gating_all_off() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(FeatureFlags::none(), &dir);

    let report = engine.process_sample(&TextSample::new("s1", "test", "I will never be happy, I want to die"));
    assert!(report.emotions.is_empty());
    assert!(report.integrity.is_empty());
    assert!(report.risks.is_empty());
    assert!(!dir.path().join("db").exists());
}

/// The master flag alone enables nothing
#[test]
fn test_master_flag_is_status_only() {
    let dir = TempDir::new().unwrap();
    let flags = FeatureFlags { enabled: true, ..FeatureFlags::none() };
    let engine = engine_with(flags, &dir);

    let report = engine.process_sample(&TextSample::new("s1", "test", "I am happy"));
    assert!(report.is_empty());
    assert!(engine.module_status().lumira_enabled);
}

/// Every layer on: emotions, incongruence, risks and a stored record
#[test]
fn test_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(FeatureFlags::all(), &dir);

    let report = engine.process_sample(&TextSample::new("s1", "journal", "I will never be happy. I want to hurt myself."));
    assert!(report.emotions.iter().any(|e| e.name == Emotion::Joy));
    assert_eq!(report.integrity.len(), 1);
    assert_eq!(report.risks.len(), 1);
    assert_eq!(report.risks[0].kind, RiskKind::SelfHarm);
    assert!(report.diagnostics.is_empty());

    let stats = engine.get_signal_stats().unwrap().unwrap();
    assert_eq!(stats.total_records, 1);
    assert_eq!(stats.records_with_risk, 1);
}

/// A week of declining entries is reported as downhill
#[test]
fn test_engine_trend_over_samples() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(FeatureFlags::all(), &dir);
    let now = Utc::now();

    let texts = [
        "I feel so happy and grateful today",
        "Such a joyful and cheerful day",
        "Happy and content with my friends",
        "I feel lonely and sad",
        "I hate myself and feel worthless",
        "I want to hurt myself",
    ];
    for (i, text) in texts.iter().enumerate() {
        let sample = TextSample::new(format!("s{}", i), "journal", *text)
            .with_timestamp(now - Duration::days(6 - i as i64) - Duration::minutes(1));
        engine.process_sample(&sample);
    }

    let window = engine.analyze_window_at(7, now).unwrap().unwrap();
    assert!(window.downhill_alert);
    assert_eq!(window.reason, TrendReason::R020_DOWNHILL);

    let summary = engine.summarize_window_at(7, now).unwrap().unwrap();
    assert!(summary.downhill_alert);
    assert_eq!(summary.record_count, 6);
    assert_eq!(summary.records_with_risk, 2);
}

/// Signals off: trend and stats are unavailable
#[test]
fn test_signals_disabled_queries() {
    let dir = TempDir::new().unwrap();
    let flags = FeatureFlags { signals_enabled: false, ..FeatureFlags::all() };
    let engine = engine_with(flags, &dir);
    engine.process_sample(&TextSample::new("s1", "test", "I am happy"));

    assert!(engine.analyze_window(7).unwrap().is_none());
    assert!(engine.get_signal_stats().unwrap().is_none());
    assert!(engine.store().is_none());
}

/// A closure can stand in for a legacy engine
#[test]
fn test_legacy_closure_adapter() {
    let dir = TempDir::new().unwrap();
    let flags = FeatureFlags { semantics_enabled: true, ..FeatureFlags::none() };
    let engine = engine_with(flags, &dir).with_legacy(|text: &str| -> Result<LegacyOutput, LegacyError> {
        Ok(LegacyOutput {
            emotions: vec![lumira::types::EmotionScore::new(Emotion::Surprise, text.len() as f64 / 100.0)],
            risks: Vec::new(),
        })
    });

    let report = engine.process_sample(&TextSample::new("s1", "test", "well well"));
    assert_eq!(report.emotions.len(), 1);
    assert_eq!(report.emotions[0].name, Emotion::Surprise);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].layer, Layer::Legacy);
}

/// Config built from a lookup map drives the engine
#[test]
fn test_engine_from_lookup_config() {
    let dir = TempDir::new().unwrap();
    let env: HashMap<&str, &str> = [(ENV_SEMANTICS_ENABLED, "yes"), (ENV_SAFETY_ENABLED, "off")].into();
    let config = LumiraConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
        .unwrap()
        .with_store_path(dir.path().join("signals.jsonl"));
    let engine = LumiraEngine::new(config);

    let status = engine.module_status();
    assert!(status.semantics_enabled);
    assert!(!status.safety_enabled);
    assert!(!status.signals_enabled);

    let report = engine.process_sample(&TextSample::new("s1", "test", "I want to hurt myself"));
    assert!(report.risks.is_empty());
}

/// Malformed flag values are rejected at load time
#[test]
fn test_invalid_flag_rejected() {
    let result = LumiraConfig::from_lookup(|name| (name == ENV_SAFETY_ENABLED).then(|| "sure".to_string()));
    assert!(matches!(result, Err(ConfigError::InvalidFlag { .. })));
}
