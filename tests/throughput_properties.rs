//! Randomized throughput properties
//!
//! Event streams are generated with arbitrary timing and damage; the
//! DPS flavors must stay non-negative, the sustained identity must hold
//! exactly, and concentrated damage must read as burst.

use combat_telemetry::{
    BoundaryKind, CombatEvent, EventLog, TelemetryConfig, ThroughputAnalyzer,
};
use proptest::prelude::*;

const SESSION_SPAN: f64 = 100.0;

fn log_from(hits: &[(f64, f64)]) -> EventLog {
    let mut log = EventLog::new();
    log.record(CombatEvent::SessionBoundary {
        kind: BoundaryKind::Start,
        timestamp: 0.0,
    })
    .unwrap();
    for &(ts, damage) in hits {
        log.record(CombatEvent::AbilityUse {
            ability: "slash".into(),
            target: "dummy".into(),
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

fn hits_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    // Timestamps deliberately unsorted: the log tolerates OCR jitter
    prop::collection::vec((0.1..SESSION_SPAN, 1.0..500.0f64), 1..80)
}

proptest! {
    #[test]
    fn prop_all_dps_flavors_non_negative(hits in hits_strategy()) {
        let log = log_from(&hits);
        let analyzer = ThroughputAnalyzer::new(TelemetryConfig::default());

        prop_assert!(analyzer.current_dps(&log, SESSION_SPAN) >= 0.0);
        prop_assert!(analyzer.burst_dps(&log) >= 0.0);
        prop_assert!(analyzer.sustained_dps(&log, SESSION_SPAN) >= 0.0);
    }

    #[test]
    fn prop_sustained_is_exactly_total_over_elapsed(hits in hits_strategy()) {
        let log = log_from(&hits);
        let analyzer = ThroughputAnalyzer::new(TelemetryConfig::default());

        let total: f64 = hits.iter().map(|(_, d)| d).sum();
        let expected = total / SESSION_SPAN.max(1.0);
        let actual = analyzer.sustained_dps(&log, SESSION_SPAN);
        prop_assert!((actual - expected).abs() <= 1e-9 * expected.max(1.0));
    }

    /// Concentrate half the session's damage into one second and the
    /// burst reading must exceed the sustained one.
    #[test]
    fn prop_burst_dominates_sustained_for_clustered_damage(
        hits in hits_strategy(),
        cluster_at in 10.0..(SESSION_SPAN - 10.0),
    ) {
        let trickle_total: f64 = hits.iter().map(|(_, d)| d).sum();
        let mut all = hits.clone();
        // Cluster carries as much damage as the whole trickle
        all.push((cluster_at, trickle_total / 2.0));
        all.push((cluster_at + 0.5, trickle_total / 2.0));

        let log = log_from(&all);
        let analyzer = ThroughputAnalyzer::new(TelemetryConfig::default());

        let burst = analyzer.burst_dps(&log);
        let sustained = analyzer.sustained_dps(&log, SESSION_SPAN);
        prop_assert!(burst >= sustained - 1e-9,
            "burst {} should dominate sustained {}", burst, sustained);
    }

    #[test]
    fn prop_current_window_never_exceeds_whole_log(hits in hits_strategy()) {
        let log = log_from(&hits);
        let analyzer = ThroughputAnalyzer::new(TelemetryConfig::default());

        let window_damage: f64 = hits
            .iter()
            .filter(|(ts, _)| *ts >= SESSION_SPAN - 5.0)
            .map(|(_, d)| d)
            .sum();
        let total: f64 = hits.iter().map(|(_, d)| d).sum();
        prop_assert!(window_damage <= total + 1e-9);

        // current_dps only ever counts window damage
        let current = analyzer.current_dps(&log, SESSION_SPAN);
        if window_damage == 0.0 {
            prop_assert!(current == 0.0);
        }
    }
}
