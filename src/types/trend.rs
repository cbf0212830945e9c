//! Trend window types and reason codes

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Emotion;

/// Aggregates for one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub records: usize,
    pub joy_average: f64,
    pub risk_rate: f64,
}

/// Aggregates for one half of the window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HalfWindow {
    pub records: usize,
    pub joy_average: f64,
    pub risk_rate: f64,
}

/// Derived trend view over a day window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendWindow {
    pub window_days: u32,
    pub record_count: usize,
    pub distinct_days: usize,
    /// Window average per label (dense over all 12)
    pub emotion_averages: BTreeMap<Emotion, f64>,
    pub daily: Vec<DailyPoint>,
    /// Trailing moving average of each label's daily mean (dense over all 12)
    pub emotion_moving_averages: BTreeMap<Emotion, Vec<f64>>,
    /// Trailing moving average of daily joy
    pub joy_moving_average: Vec<f64>,
    /// Trailing moving average of daily risk rate
    pub risk_moving_average: Vec<f64>,
    /// Records with ≥1 risk flag / total records
    pub risk_rate: f64,
    pub first_half: HalfWindow,
    pub second_half: HalfWindow,
    pub reason: TrendReason,
    pub downhill_alert: bool,
}

impl TrendWindow {
    /// Joy change from first to second half (negative = falling)
    pub fn joy_delta(&self) -> f64 {
        self.second_half.joy_average - self.first_half.joy_average
    }

    /// Risk-rate change from first to second half (positive = rising)
    pub fn risk_delta(&self) -> f64 {
        self.second_half.risk_rate - self.first_half.risk_rate
    }
}

/// Reason codes for trend outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum TrendReason {
    /// Joy falling AND risk rising
    R020_DOWNHILL,
    /// Joy falling, risk flat or falling
    R021_JOY_FALLING,
    /// Risk rising, joy flat or rising
    R022_RISK_RISING,
    /// Neither signal moved the wrong way
    R023_STABLE,
}

impl TrendReason {
    /// Get reason code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::R020_DOWNHILL => "R020_DOWNHILL",
            Self::R021_JOY_FALLING => "R021_JOY_FALLING",
            Self::R022_RISK_RISING => "R022_RISK_RISING",
            Self::R023_STABLE => "R023_STABLE",
        }
    }

    /// Get human description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R020_DOWNHILL => "Joy decreasing and risk increasing over time",
            Self::R021_JOY_FALLING => "Joy decreasing, risk not increasing",
            Self::R022_RISK_RISING => "Risk increasing, joy not decreasing",
            Self::R023_STABLE => "No downhill movement",
        }
    }

    /// Classify a half-vs-half comparison; ties never count as movement
    pub fn classify(joy_falling: bool, risk_rising: bool) -> Self {
        match (joy_falling, risk_rising) {
            (true, true) => Self::R020_DOWNHILL,
            (true, false) => Self::R021_JOY_FALLING,
            (false, true) => Self::R022_RISK_RISING,
            (false, false) => Self::R023_STABLE,
        }
    }
}

impl std::fmt::Display for TrendReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
