//! Orchestration engine
//!
//! Runs the enabled layers over a sample, isolates each layer so one failure
//! cannot take the report down, optionally merges a legacy analyzer, and
//! appends the stored projection when signals are on.

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::LumiraConfig;
use crate::core::incongruence::IncongruenceDetector;
use crate::core::lexicon::EmotionClassifier;
use crate::core::safety::{reconcile_flags, truncate_chars, SafetyScanner};
use crate::core::store::SignalStore;
use crate::core::summary::summarize_records;
use crate::core::trend::TrendAnalyzer;
use crate::error::{ConfigError, LegacyError, StoreError};
use crate::types::{
    AnalysisReport, Diagnostic, EmotionScore, Layer, ModuleStatus, RiskFlag, SignalRecord,
    StoreStats, TextSample, TrendWindow, WindowSummary,
};

/// What a legacy analyzer contributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyOutput {
    pub emotions: Vec<EmotionScore>,
    pub risks: Vec<RiskFlag>,
}

/// Adapter over an older analysis engine
pub trait LegacyAnalyzer {
    fn analyze(&self, text: &str) -> Result<LegacyOutput, LegacyError>;
}

impl<F> LegacyAnalyzer for F
where
    F: Fn(&str) -> Result<LegacyOutput, LegacyError>,
{
    fn analyze(&self, text: &str) -> Result<LegacyOutput, LegacyError> {
        self(text)
    }
}

/// LUMIRA engine
pub struct LumiraEngine {
    config: LumiraConfig,
    classifier: EmotionClassifier,
    detector: IncongruenceDetector,
    scanner: SafetyScanner,
    store: Option<SignalStore>,
    legacy: Option<Box<dyn LegacyAnalyzer>>,
}

impl LumiraEngine {
    /// Build an engine; flags are fixed from here on
    pub fn new(config: LumiraConfig) -> Self {
        let store = config.flags.signals_enabled
            .then(|| SignalStore::new(config.store_path.clone()));

        info!(
            lumira = config.flags.enabled,
            semantics = config.flags.semantics_enabled,
            safety = config.flags.safety_enabled,
            signals = config.flags.signals_enabled,
            "engine constructed"
        );

        Self {
            config,
            classifier: EmotionClassifier::new(),
            detector: IncongruenceDetector::new(),
            scanner: SafetyScanner::new(),
            store,
            legacy: None,
        }
    }

    /// Build from LUMIRA_* environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(LumiraConfig::from_env()?))
    }

    /// Attach a legacy analyzer whose output is merged into every report
    pub fn with_legacy(mut self, adapter: impl LegacyAnalyzer + 'static) -> Self {
        self.legacy = Some(Box::new(adapter));
        self
    }

    pub fn config(&self) -> &LumiraConfig {
        &self.config
    }

    /// Signal store, when signals are enabled
    pub fn store(&self) -> Option<&SignalStore> {
        self.store.as_ref()
    }

    /// Analyze one sample
    pub fn process_sample(&self, sample: &TextSample) -> AnalysisReport {
        let flags = self.config.flags;
        let text = sample.text.as_str();
        let mut report = AnalysisReport::empty(&sample.id);

        if flags.semantics_enabled {
            let semantics = isolate(Layer::Semantics, || {
                let emotions = self.classifier.classify(text);
                let integrity = self.detector.detect(text, &emotions);
                (emotions, integrity)
            });
            match semantics {
                Ok((emotions, integrity)) => {
                    report.emotions = emotions;
                    report.integrity = integrity;
                }
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
        }

        if flags.safety_enabled {
            match isolate(Layer::Safety, || self.scanner.scan(text)) {
                Ok(risks) => report.risks = risks,
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
        }

        if let Some(legacy) = &self.legacy {
            if flags.semantics_enabled || flags.safety_enabled {
                self.merge_legacy(legacy.as_ref(), text, &mut report);
            }
        }

        if let Some(store) = &self.store {
            let record = SignalRecord::from_report(sample, &report);
            if let Err(e) = store.append(&record) {
                warn!(error = %e, "signal append failed");
                report.diagnostics.push(Diagnostic::new(Layer::Signals, e.to_string()));
            }
        }

        debug!(
            emotions = report.emotions.len(),
            integrity = report.integrity.len(),
            risks = report.risks.len(),
            diagnostics = report.diagnostics.len(),
            "sample processed"
        );

        report
    }

    fn merge_legacy(&self, legacy: &dyn LegacyAnalyzer, text: &str, report: &mut AnalysisReport) {
        let output = match isolate(Layer::Legacy, || legacy.analyze(text)) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(error = %e, "legacy analyzer returned an error");
                report.diagnostics.push(Diagnostic::new(Layer::Legacy, e.to_string()));
                return;
            }
            Err(diagnostic) => {
                report.diagnostics.push(diagnostic);
                return;
            }
        };

        if self.config.flags.semantics_enabled {
            for emotion in output.emotions {
                let known = report.emotions.iter().any(|e| e.name == emotion.name);
                if !known && emotion.score.is_finite() && emotion.score > 0.0 {
                    report.emotions.push(EmotionScore::new(emotion.name, emotion.score.min(1.0)));
                }
            }
            report.emotions.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.name.cmp(&b.name)));
        }

        if self.config.flags.safety_enabled && !output.risks.is_empty() {
            let mut risks = std::mem::take(&mut report.risks);
            risks.extend(output.risks.into_iter().map(|risk| RiskFlag {
                excerpt: truncate_chars(&risk.excerpt),
                ..risk
            }));
            report.risks = reconcile_flags(risks);
        }

        report.diagnostics.push(Diagnostic::new(
            Layer::Legacy,
            "legacy analyzer output merged; the legacy engine is deprecated",
        ));
    }

    /// Trend over the last `days` days; Ok(None) when signals are off or
    /// data is short, Err when the store cannot be read
    pub fn analyze_window(&self, days: u32) -> Result<Option<TrendWindow>, StoreError> {
        self.analyze_window_at(days, Utc::now())
    }

    pub fn analyze_window_at(&self, days: u32, now: DateTime<Utc>) -> Result<Option<TrendWindow>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        TrendAnalyzer::new(store.clone())
            .analyze_window_at(days, now)
            .inspect_err(|e| warn!(error = %e, "window analysis failed"))
    }

    /// Store statistics; Ok(None) when signals are off
    pub fn get_signal_stats(&self) -> Result<Option<StoreStats>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        store.stats()
            .map(Some)
            .inspect_err(|e| warn!(error = %e, "failed to read signal stats"))
    }

    /// Report-ready summary of the last `days` days; Ok(None) when signals are off
    pub fn summarize_window(&self, days: u32) -> Result<Option<WindowSummary>, StoreError> {
        self.summarize_window_at(days, Utc::now())
    }

    pub fn summarize_window_at(&self, days: u32, now: DateTime<Utc>) -> Result<Option<WindowSummary>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let records = store.read_window_at(days, now)
            .inspect_err(|e| warn!(error = %e, "window summary failed"))?;
        Ok(Some(summarize_records(&records, days, now)))
    }

    pub fn module_status(&self) -> ModuleStatus {
        let flags = self.config.flags;
        ModuleStatus {
            lumira_enabled: flags.enabled,
            semantics_enabled: flags.semantics_enabled,
            safety_enabled: flags.safety_enabled,
            signals_enabled: flags.signals_enabled,
            legacy_adapter: self.legacy.is_some(),
        }
    }
}

/// Run a layer, turning a panic into a diagnostic
fn isolate<T>(layer: Layer, f: impl FnOnce() -> T) -> Result<T, Diagnostic> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let detail = payload.downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown failure".to_string());
        warn!(layer = %layer, "layer failed; output degraded to empty");
        Diagnostic::new(layer, format!("{} layer failed: {}", layer, detail))
    })
}

// =============================================================================
// TESTS
// =============================================================================
