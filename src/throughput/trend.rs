//! DPS trend classification
//!
//! Buckets damage into fixed time slices anchored at the session start,
//! then classifies direction (first third vs last third of buckets) and
//! consistency (coefficient of variation of bucket DPS).

use serde::Serialize;

use crate::core::config::TelemetryConfig;
use crate::event::EventLog;

/// Relative change above which the trend counts as a move
const TREND_SHIFT_RATIO: f64 = 0.10;

/// Coefficient-of-variation cutoffs for consistency classes
const CONSISTENCY_HIGH_CV: f64 = 0.25;
const CONSISTENCY_MEDIUM_CV: f64 = 0.50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    High,
    Medium,
    Low,
}

/// Trend summary over one session
#[derive(Clone, Debug, Serialize)]
pub struct DpsTrend {
    pub average_dps: f64,
    pub peak_dps: f64,
    pub direction: TrendDirection,
    pub consistency: Consistency,
}

impl DpsTrend {
    fn empty() -> Self {
        Self {
            average_dps: 0.0,
            peak_dps: 0.0,
            direction: TrendDirection::Stable,
            consistency: Consistency::High,
        }
    }
}

/// Classify the DPS trend of a session's damage stream
pub fn analyze_trend(config: &TelemetryConfig, log: &EventLog, now: f64) -> DpsTrend {
    let start = match log.session_start() {
        Some(ts) => ts,
        None => return DpsTrend::empty(),
    };
    let width = config.trend_bucket_secs;
    let elapsed = (now - start).max(0.0);
    let bucket_count = ((elapsed / width).ceil() as usize).max(1);

    let mut buckets = vec![0.0f64; bucket_count];
    for (ts, damage) in log.damage_events() {
        let offset = (ts - start).max(0.0);
        let index = ((offset / width).floor() as usize).min(bucket_count - 1);
        buckets[index] += damage;
    }

    // Bucket DPS, not raw damage: the trailing bucket may be partial
    let rates: Vec<f64> = buckets
        .iter()
        .enumerate()
        .map(|(i, total)| {
            let span = if i + 1 == bucket_count {
                (elapsed - i as f64 * width).max(1.0).min(width)
            } else {
                width
            };
            total / span
        })
        .collect();

    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    let peak = rates.iter().cloned().fold(0.0f64, f64::max);

    let direction = classify_direction(&rates);
    let consistency = classify_consistency(&rates, mean);

    DpsTrend {
        average_dps: mean,
        peak_dps: peak,
        direction,
        consistency,
    }
}

fn classify_direction(rates: &[f64]) -> TrendDirection {
    if rates.len() < 3 {
        return TrendDirection::Stable;
    }
    let third = rates.len() / 3;
    let early: f64 = rates[..third].iter().sum::<f64>() / third as f64;
    let late: f64 = rates[rates.len() - third..].iter().sum::<f64>() / third as f64;

    if early <= 0.0 {
        return if late > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Stable
        };
    }

    let shift = (late - early) / early;
    if shift > TREND_SHIFT_RATIO {
        TrendDirection::Increasing
    } else if shift < -TREND_SHIFT_RATIO {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

fn classify_consistency(rates: &[f64], mean: f64) -> Consistency {
    if mean <= 0.0 || rates.len() < 2 {
        return Consistency::High;
    }
    let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / rates.len() as f64;
    let cv = variance.sqrt() / mean;

    if cv <= CONSISTENCY_HIGH_CV {
        Consistency::High
    } else if cv <= CONSISTENCY_MEDIUM_CV {
        Consistency::Medium
    } else {
        Consistency::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{BoundaryKind, CombatEvent};

    fn log_with(hits: &[(f64, f64)]) -> EventLog {
        let mut log = EventLog::new();
        log.record(CombatEvent::SessionBoundary {
            kind: BoundaryKind::Start,
            timestamp: 0.0,
        })
        .unwrap();
        for &(ts, damage) in hits {
            log.record(CombatEvent::AbilityUse {
                ability: "slash".into(),
                target: "goblin".into(),
                damage,
                damage_type: "melee".into(),
                succeeded: true,
                cooldown_remaining: 0.0,
                xp_gained: 0.0,
                timestamp: ts,
            })
            .unwrap();
        }
        log
    }

    #[test]
    fn test_empty_log_is_stable() {
        let trend = analyze_trend(&TelemetryConfig::default(), &EventLog::new(), 100.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.average_dps, 0.0);
    }

    #[test]
    fn test_ramping_damage_reads_increasing() {
        // 6 buckets of 10s; damage grows bucket over bucket
        let hits: Vec<(f64, f64)> = (0..6).map(|i| (i as f64 * 10.0 + 5.0, (i + 1) as f64 * 100.0)).collect();
        let trend = analyze_trend(&TelemetryConfig::default(), &log_with(&hits), 60.0);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_eq!(trend.consistency, Consistency::Medium);
    }

    #[test]
    fn test_fading_damage_reads_decreasing() {
        let hits: Vec<(f64, f64)> = (0..6).map(|i| (i as f64 * 10.0 + 5.0, (6 - i) as f64 * 100.0)).collect();
        let trend = analyze_trend(&TelemetryConfig::default(), &log_with(&hits), 60.0);
        assert_eq!(trend.direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_flat_damage_reads_stable_and_consistent() {
        let hits: Vec<(f64, f64)> = (0..6).map(|i| (i as f64 * 10.0 + 5.0, 100.0)).collect();
        let trend = analyze_trend(&TelemetryConfig::default(), &log_with(&hits), 60.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.consistency, Consistency::High);
        assert!((trend.average_dps - 10.0).abs() < 1e-9);
        assert!((trend.peak_dps - 10.0).abs() < 1e-9);
    }
}
