//! End-to-end session lifecycle tests
//!
//! Exercises the recorder, store and analyzers together the way the
//! host automation loop drives them.

use combat_telemetry::core::error::TelemetryError;
use combat_telemetry::{
    RotationAnalyzer, SessionRecorder, SessionStore, TelemetryConfig,
};
use tempfile::TempDir;

/// Five 100-damage hits over exactly five seconds sustain 100 DPS.
#[test]
fn test_five_hits_over_five_seconds_is_100_dps() {
    let mut recorder = SessionRecorder::new(TelemetryConfig::default());
    recorder.start_session_at(Some("grind".into()), 0.0).unwrap();
    for i in 0..5 {
        recorder
            .log_ability_use_at("slash", "dummy", 100.0, "melee", true, 0.0, 0.0, i as f64 + 1.0)
            .unwrap();
    }
    let record = recorder.end_session_at(5.0).unwrap();

    assert_eq!(record.summary.duration, 5.0);
    assert!((record.summary.dps - 100.0).abs() < 1e-9);
}

/// Logging before start and ending twice both surface NoActiveSession.
#[test]
fn test_lifecycle_errors() {
    let mut recorder = SessionRecorder::new(TelemetryConfig::default());

    let err = recorder
        .log_ability_use_at("slash", "dummy", 10.0, "melee", true, 0.0, 0.0, 1.0)
        .unwrap_err();
    assert!(matches!(err, TelemetryError::NoActiveSession));

    recorder.start_session_at(Some("s".into()), 0.0).unwrap();
    recorder.end_session_at(10.0).unwrap();
    let err = recorder.end_session_at(11.0).unwrap_err();
    assert!(matches!(err, TelemetryError::NoActiveSession));
}

/// A session with 1 rare use in 1000 invocations flags the rare ability
/// as "consider removing" (not "remove": it was used once).
#[test]
fn test_dead_skill_scenario() {
    let config = TelemetryConfig::default();
    let mut recorder = SessionRecorder::new(config.clone());
    recorder.start_session_at(Some("grind".into()), 0.0).unwrap();
    for i in 0..999 {
        recorder
            .log_ability_use_at(
                "slash",
                "dummy",
                10.0,
                "melee",
                true,
                0.0,
                1.0,
                (i as f64) * 0.5 + 1.0,
            )
            .unwrap();
    }
    recorder
        .log_ability_use_at("rare_ability", "dummy", 10.0, "melee", true, 0.0, 1.0, 501.0)
        .unwrap();
    let record = recorder.end_session_at(600.0).unwrap();

    let analyzer = RotationAnalyzer::new(config);
    let dead = analyzer.find_dead_skills(&[record.summary]);

    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].skill_name, "rare_ability");
    assert!((dead[0].usage_percentage - 0.1).abs() < 1e-9);
    assert_eq!(dead[0].recommended_action.as_str(), "consider removing");
}

/// compare([A, B]) with A at 50 dps and B at 80 dps picks B and reports
/// the 50..80 range.
#[test]
fn test_store_comparison_scenario() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path()).unwrap();
    let config = TelemetryConfig::default();

    for (id, damage) in [("A", 500.0), ("B", 800.0)] {
        let mut recorder = SessionRecorder::new(config.clone());
        recorder.start_session_at(Some(id.into()), 0.0).unwrap();
        recorder
            .log_ability_use_at("slash", "dummy", damage, "melee", true, 0.0, 0.0, 1.0)
            .unwrap();
        let record = recorder.end_session_at(10.0).unwrap();
        store.save(&record).unwrap();
    }

    let report = store.compare(&["A".into(), "B".into()]).unwrap();
    assert_eq!(report.best_performing_session, "B");
    assert_eq!(report.dps_range.min, 50.0);
    assert_eq!(report.dps_range.max, 80.0);
}

/// The full loop: record, end, persist, re-analyze from disk.
#[test]
fn test_record_persist_reanalyze() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path()).unwrap();
    let config = TelemetryConfig::default();

    let mut recorder = SessionRecorder::new(config.clone());
    recorder.start_session_at(Some("raid".into()), 0.0).unwrap();
    recorder
        .log_ability_use_at("fireball", "boss", 400.0, "magic", true, 2.0, 120.0, 1.0)
        .unwrap();
    recorder
        .log_ability_use_at("slash", "boss", 150.0, "melee", true, 0.0, 40.0, 2.0)
        .unwrap();
    recorder.log_enemy_kill_at("boss", 500.0, 3.0).unwrap();
    let record = recorder.end_session_at(60.0).unwrap();
    store.save(&record).unwrap();

    let corpus = store.load_all().unwrap();
    assert_eq!(corpus.len(), 1);

    let analyzer = RotationAnalyzer::new(config);
    let ranked = analyzer.rank_most_efficient(&corpus, 5);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].rotation_id, "rotation_raid");
    assert_eq!(ranked[0].abilities_used.len(), 2);
    assert!(ranked[0].ability_efficiency["fireball"].damage_share > 0.7);
}
