//! Input sample

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of text to analyze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSample {
    /// Caller-assigned unique id
    pub id: String,
    /// When the text was produced
    pub timestamp: DateTime<Utc>,
    /// Origin tag (e.g. "journal", "chat", "cli")
    pub source: String,
    /// Raw text
    pub text: String,
    /// Arbitrary caller metadata
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl TextSample {
    /// Create a sample stamped with the current time
    pub fn new(id: impl Into<String>, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            source: source.into(),
            text: text.into(),
            meta: BTreeMap::new(),
        }
    }

    /// Override the timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}
