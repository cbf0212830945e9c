//! Trend analyzer
//!
//! Derives a TrendWindow from stored signal records: per-label averages,
//! per-day points with trailing moving averages, and a half-vs-half
//! comparison that raises the downhill alert when joy falls while the risk
//! rate rises. Nothing derived here is persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::core::store::SignalStore;
use crate::error::StoreError;
use crate::types::{DailyPoint, Emotion, HalfWindow, SignalRecord, TrendReason, TrendWindow};
use crate::{MIN_TREND_DAYS, MIN_TREND_RECORDS, MOVING_AVERAGE_SPAN};

/// Trend analyzer over a signal store
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    store: SignalStore,
}

impl TrendAnalyzer {
    pub fn new(store: SignalStore) -> Self {
        Self { store }
    }

    /// Analyze the last `days` days; None when data is insufficient
    pub fn analyze_window(&self, days: u32) -> Result<Option<TrendWindow>, StoreError> {
        self.analyze_window_at(days, Utc::now())
    }

    /// Analyze the window ending at `now`
    pub fn analyze_window_at(&self, days: u32, now: DateTime<Utc>) -> Result<Option<TrendWindow>, StoreError> {
        let records = self.store.read_window_at(days, now)?;
        Ok(analyze_records(&records, days))
    }
}

/// Compute a trend window over already-filtered records
pub fn analyze_records(records: &[SignalRecord], window_days: u32) -> Option<TrendWindow> {
    if records.len() < MIN_TREND_RECORDS {
        debug!(records = records.len(), "too few records for trend");
        return None;
    }

    let mut ordered: Vec<&SignalRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let mut by_day: BTreeMap<NaiveDate, Vec<&SignalRecord>> = BTreeMap::new();
    for &record in &ordered {
        by_day.entry(record.timestamp.date_naive()).or_default().push(record);
    }

    if by_day.len() < MIN_TREND_DAYS {
        debug!(days = by_day.len(), "too few distinct days for trend");
        return None;
    }

    let emotion_averages: BTreeMap<Emotion, f64> = Emotion::ALL.iter()
        .map(|&e| (e, mean(ordered.iter().map(|r| r.score_of(e)))))
        .collect();

    let daily: Vec<DailyPoint> = by_day.iter()
        .map(|(date, day)| DailyPoint {
            date: *date,
            records: day.len(),
            joy_average: joy_average(day),
            risk_rate: risk_rate(day),
        })
        .collect();

    let emotion_moving_averages: BTreeMap<Emotion, Vec<f64>> = Emotion::ALL.iter()
        .map(|&e| {
            let series: Vec<f64> = by_day.values()
                .map(|day| mean(day.iter().map(|r| r.score_of(e))))
                .collect();
            (e, moving_average(&series, MOVING_AVERAGE_SPAN))
        })
        .collect();

    let joy_series: Vec<f64> = daily.iter().map(|d| d.joy_average).collect();
    let risk_series: Vec<f64> = daily.iter().map(|d| d.risk_rate).collect();

    let (first, second) = ordered.split_at(ordered.len() / 2);
    let first_half = half(first);
    let second_half = half(second);

    let joy_falling = second_half.joy_average < first_half.joy_average;
    let risk_rising = second_half.risk_rate > first_half.risk_rate;
    let reason = TrendReason::classify(joy_falling, risk_rising);
    let downhill_alert = reason == TrendReason::R020_DOWNHILL;

    if downhill_alert {
        info!(
            window_days,
            joy_first = first_half.joy_average,
            joy_second = second_half.joy_average,
            risk_first = first_half.risk_rate,
            risk_second = second_half.risk_rate,
            "downhill trend detected"
        );
    }

    Some(TrendWindow {
        window_days,
        record_count: ordered.len(),
        distinct_days: by_day.len(),
        emotion_averages,
        emotion_moving_averages,
        joy_moving_average: moving_average(&joy_series, MOVING_AVERAGE_SPAN),
        risk_moving_average: moving_average(&risk_series, MOVING_AVERAGE_SPAN),
        daily,
        risk_rate: risk_rate(&ordered),
        first_half,
        second_half,
        reason,
        downhill_alert,
    })
}

/// Trailing moving average; a span covering the whole series flattens it
/// to the overall mean
pub fn moving_average(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }
    if span >= values.len() {
        let m = mean(values.iter().copied());
        return vec![m; values.len()];
    }

    (0..values.len())
        .map(|i| {
            let from = (i + 1).saturating_sub(span);
            mean(values[from..=i].iter().copied())
        })
        .collect()
}

fn half(records: &[&SignalRecord]) -> HalfWindow {
    HalfWindow {
        records: records.len(),
        joy_average: joy_average(records),
        risk_rate: risk_rate(records),
    }
}

fn joy_average(records: &[&SignalRecord]) -> f64 {
    mean(records.iter().map(|r| r.score_of(Emotion::Joy)))
}

fn risk_rate(records: &[&SignalRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().filter(|r| r.has_risk()).count() as f64 / records.len() as f64
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskKind, Severity};
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(day: i64, joy: f64, risky: bool) -> SignalRecord {
        let r = SignalRecord::new(format!("d{}", day), base() + Duration::days(day))
            .with_emotion(Emotion::Joy, joy);
        if risky {
            r.with_risk(RiskKind::SelfHate, Severity::Low)
        } else {
            r
        }
    }

    #[test]
    fn test_insufficient_records() {
        assert!(analyze_records(&[], 7).is_none());
        assert!(analyze_records(&[record(0, 0.5, false)], 7).is_none());
    }

    #[test]
    fn test_single_day_is_insufficient() {
        let records = vec![record(0, 0.5, false), record(0, 0.4, true)];
        assert!(analyze_records(&records, 7).is_none());
    }

    #[test]
    fn test_downhill_alert() {
        let records = vec![
            record(0, 0.8, false),
            record(1, 0.7, false),
            record(2, 0.3, true),
            record(3, 0.2, true),
        ];
        let trend = analyze_records(&records, 7).unwrap();
        assert!(trend.downhill_alert);
        assert_eq!(trend.reason, TrendReason::R020_DOWNHILL);
        assert_eq!(trend.first_half.records, 2);
        assert_eq!(trend.second_half.records, 2);
        assert!(trend.joy_delta() < 0.0);
        assert!(trend.risk_delta() > 0.0);
        assert!((trend.risk_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_joy_falling_without_risk_rise() {
        let records = vec![
            record(0, 0.8, true),
            record(1, 0.7, false),
            record(2, 0.3, true),
            record(3, 0.2, false),
        ];
        let trend = analyze_records(&records, 7).unwrap();
        assert!(!trend.downhill_alert);
        assert_eq!(trend.reason, TrendReason::R021_JOY_FALLING);
    }

    #[test]
    fn test_ties_do_not_alert() {
        let records = vec![record(0, 0.5, false), record(1, 0.5, false)];
        let trend = analyze_records(&records, 7).unwrap();
        assert_eq!(trend.reason, TrendReason::R023_STABLE);
        assert!(!trend.downhill_alert);
    }

    #[test]
    fn test_halves_follow_timestamp_order() {
        // Appended out of order; halves still split chronologically
        let records = vec![
            record(3, 0.2, true),
            record(0, 0.8, false),
            record(2, 0.3, true),
            record(1, 0.7, false),
        ];
        let trend = analyze_records(&records, 7).unwrap();
        assert!(trend.downhill_alert);
    }

    #[test]
    fn test_emotion_averages_dense() {
        let records = vec![record(0, 0.6, false), record(1, 0.2, false)];
        let trend = analyze_records(&records, 7).unwrap();
        assert_eq!(trend.emotion_averages.len(), 12);
        assert!((trend.emotion_averages[&Emotion::Joy] - 0.4).abs() < 1e-9);
        assert_eq!(trend.emotion_averages[&Emotion::Fear], 0.0);
    }

    #[test]
    fn test_daily_points() {
        let records = vec![
            record(0, 0.6, false),
            record(0, 0.4, true),
            record(1, 0.2, false),
        ];
        let trend = analyze_records(&records, 7).unwrap();
        assert_eq!(trend.distinct_days, 2);
        assert_eq!(trend.daily.len(), 2);
        assert_eq!(trend.daily[0].records, 2);
        assert!((trend.daily[0].joy_average - 0.5).abs() < 1e-9);
        assert!((trend.daily[0].risk_rate - 0.5).abs() < 1e-9);
        assert_eq!(trend.joy_moving_average.len(), 2);
    }

    #[test]
    fn test_moving_average_per_label() {
        let records: Vec<SignalRecord> = (0..4)
            .map(|day| {
                let r = record(day, 0.2 * day as f64, false);
                if day == 3 { r.with_emotion(Emotion::Fear, 0.9) } else { r }
            })
            .collect();

        let trend = analyze_records(&records, 7).unwrap();
        assert_eq!(trend.emotion_moving_averages.len(), 12);
        assert_eq!(trend.emotion_moving_averages[&Emotion::Joy], trend.joy_moving_average);

        let fear = &trend.emotion_moving_averages[&Emotion::Fear];
        assert_eq!(fear.len(), 4);
        assert_eq!(fear[2], 0.0);
        assert!((fear[3] - 0.3).abs() < 1e-9);
        assert!(trend.emotion_moving_averages[&Emotion::Anger].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_moving_average() {
        assert!(moving_average(&[], 3).is_empty());
        assert_eq!(moving_average(&[1.0, 3.0], 3), vec![2.0, 2.0]);
        assert_eq!(moving_average(&[3.0, 3.0, 3.0, 6.0], 3), vec![3.0, 3.0, 3.0, 4.0]);
    }
}
