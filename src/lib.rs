//! LUMIRA: offline emotion, incongruence and safety-signal analysis
//!
//! Pipeline: TextSample → classifier / incongruence / safety → AnalysisReport
//! → signal store (append) → trend analyzer (on demand).
//!
//! Every decision comes from local lexicons and rules. Reports are advisory
//! heuristics, not clinical assessments.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// LEXICON SCORING
// =============================================================================

/// Weight of a plain keyword hit
pub const LEXICON_WEIGHT_BASE: f64 = 1.0;

/// Weight of a multi-word phrase hit (phrases are more specific)
pub const LEXICON_WEIGHT_PHRASE: f64 = 1.5;

/// Weight of a strong keyword (e.g. "ecstatic", "devastated", "woedend")
pub const LEXICON_WEIGHT_STRONG: f64 = 2.0;

/// Multiplier applied when an intensifier precedes a keyword
pub const INTENSIFIER_BOOST: f64 = 1.5;

/// How many tokens back an intensifier may sit
pub const INTENSIFIER_REACH: usize = 2;

/// Upper bound for a single emotion score
pub const EMOTION_SCORE_CAP: f64 = 1.0;

// =============================================================================
// INCONGRUENCE
// =============================================================================

/// Tokens to look back from an emotion token for future/negation markers
pub const INCONGRUENCE_WINDOW: usize = 5;

/// Confidence floor for a qualifying future-negation occurrence
pub const INCONGRUENCE_MIN_CONFIDENCE: f64 = 0.2;

/// Damping for future-negation around non-positive emotions
pub const NON_POSITIVE_VALENCE_DAMPING: f64 = 0.5;

/// Both emotions of a conflicting pair must reach this score
pub const CONFLICT_MIN_SCORE: f64 = 0.15;

// =============================================================================
// SAFETY
// =============================================================================

/// Hard cap on excerpt length (characters)
pub const EXCERPT_MAX_CHARS: usize = 160;

/// Context kept on each side of a match
pub const EXCERPT_CONTEXT_CHARS: usize = 40;

/// Severe (high/critical) flags needed to synthesize an escalation
pub const ESCALATION_MIN_SEVERE: usize = 2;

// =============================================================================
// SIGNALS & TRENDS
// =============================================================================

/// Default store location, overridable via LUMIRA_DB_PATH
pub const DEFAULT_STORE_PATH: &str = ".lumira/signals.jsonl";

/// Persisted record format version
pub const SIGNAL_RECORD_VERSION: u8 = 1;

/// Hex characters kept from an excerpt digest
pub const EXCERPT_DIGEST_LEN: usize = 16;

/// Minimum records in a window before trends are computed
pub const MIN_TREND_RECORDS: usize = 2;

/// Minimum distinct UTC days in a window before trends are computed
pub const MIN_TREND_DAYS: usize = 2;

/// Span (in days) of the trailing moving averages
pub const MOVING_AVERAGE_SPAN: usize = 3;

/// Default trend window
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";

/// Attached to every rendered report
pub const ADVISORY_NOTICE: &str =
    "LUMIRA is not a medical device. Output is a non-diagnostic heuristic.";
