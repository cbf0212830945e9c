//! Core types for LUMIRA

mod sample;
mod emotion;
mod integrity;
mod risk;
mod report;
mod signal;
mod trend;
mod summary;

pub use sample::TextSample;
pub use emotion::{Emotion, EmotionScore, EmotionHit, EmotionAnalysis, Language, LanguageHits, Valence};
pub use integrity::{IntegrityKind, IntegritySignal, TextSpan};
pub use risk::{RiskKind, Severity, RiskFlag, SafetySummary};
pub use report::{AnalysisReport, Diagnostic, Layer, ModuleStatus};
pub use signal::{SignalRecord, StoredRisk, StoreStats};
pub use trend::{TrendWindow, DailyPoint, HalfWindow, TrendReason};
pub use summary::{WindowSummary, RiskHighlight};
