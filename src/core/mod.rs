//! Core modules for LUMIRA

pub mod lexicon;
pub mod incongruence;
pub mod safety;
pub mod store;
pub mod trend;
pub mod summary;
pub mod engine;

pub use lexicon::{tokenize, EmotionClassifier, Token};
pub use incongruence::IncongruenceDetector;
pub use safety::{excerpt_around, summarize, SafetyScanner, ESCALATION_PATTERN};
pub use store::{window_start, SignalStore, StoreScan};
pub use trend::{analyze_records, moving_average, TrendAnalyzer};
pub use summary::{render_json, render_markdown, summarize_records};
pub use engine::{LegacyAnalyzer, LegacyOutput, LumiraEngine};
