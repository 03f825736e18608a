//! Process-level telemetry handle
//!
//! One explicitly-constructed `CombatTelemetry` value owns the recorder,
//! the store and the analyzers. The host automation loop creates it at
//! startup, drives it synchronously from its control loop, and drops it
//! at shutdown. There is no ambient global instance.

use std::path::Path;

use serde_json::Value;

use crate::core::config::TelemetryConfig;
use crate::core::error::{Result, TelemetryError};
use crate::performance::PerformanceAnalyzer;
use crate::report;
use crate::rotation::RotationAnalyzer;
use crate::session::{SessionRecorder, SessionSummary};
use crate::store::SessionStore;
use crate::throughput::{analyze_trend, damage_efficiency};

/// Outcome of ending a session
///
/// The summary is never lost: if the store write fails, the error is
/// surfaced alongside it and the caller decides whether to retry.
#[derive(Debug)]
pub struct SessionEnd {
    pub summary: SessionSummary,
    pub persistence_error: Option<TelemetryError>,
}

/// Facade over the whole telemetry engine
pub struct CombatTelemetry {
    config: TelemetryConfig,
    recorder: SessionRecorder,
    store: SessionStore,
    performance: PerformanceAnalyzer,
    rotation: RotationAnalyzer,
}

impl CombatTelemetry {
    /// Open (or create) the store at `store_dir` and build the engine
    pub fn open(store_dir: impl AsRef<Path>, config: TelemetryConfig) -> Result<Self> {
        let store = SessionStore::open(store_dir.as_ref())?;
        Ok(Self {
            recorder: SessionRecorder::new(config.clone()),
            performance: PerformanceAnalyzer::new(config.clone()),
            rotation: RotationAnalyzer::new(config.clone()),
            store,
            config,
        })
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    // === Session lifecycle ===

    pub fn start_session(&mut self, session_id: Option<String>) -> Result<String> {
        self.recorder.start_session(session_id)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record_ability_use(
        &mut self,
        ability: &str,
        target: &str,
        damage: f64,
        damage_type: &str,
        succeeded: bool,
        cooldown_remaining: f64,
        xp_gained: f64,
    ) -> Result<()> {
        self.recorder.log_ability_use(
            ability,
            target,
            damage,
            damage_type,
            succeeded,
            cooldown_remaining,
            xp_gained,
        )
    }

    pub fn record_enemy_kill(&mut self, enemy_type: &str, xp_gained: f64) -> Result<()> {
        self.recorder.log_enemy_kill(enemy_type, xp_gained)
    }

    pub fn record_player_death(&mut self) -> Result<()> {
        self.recorder.log_player_death()
    }

    /// Finalize the active session and persist it.
    ///
    /// A failed store write does not lose the summary; it comes back
    /// with the persistence error attached.
    pub fn end_session(&mut self) -> Result<SessionEnd> {
        let record = self.recorder.end_session()?;
        let persistence_error = match self.store.save(&record) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    session_id = %record.summary.session_id,
                    error = %e,
                    "session summary computed but store write failed"
                );
                Some(e)
            }
        };
        Ok(SessionEnd {
            summary: record.summary,
            persistence_error,
        })
    }

    pub fn abort_session(&mut self) -> Result<String> {
        self.recorder.abort_session()
    }

    // === Live stats ===

    pub fn current_dps(&self) -> f64 {
        self.recorder.current_dps()
    }

    /// Live session snapshot as a plain JSON map
    pub fn session_stats(&self) -> Value {
        let stats = self.recorder.session_stats();
        let log = self.recorder.event_log();
        let now = stats.elapsed_seconds + log.session_start().unwrap_or(0.0);
        let trend = analyze_trend(&self.config, log, now);
        let efficiency = damage_efficiency(log);
        report::session_stats_report(&stats, &trend, &efficiency)
    }

    // === Reports over stored sessions ===

    /// Full performance report for a stored session, `None` if unknown
    pub fn get_performance_report(&self, session_id: &str) -> Result<Option<Value>> {
        Ok(self
            .store
            .load(session_id)?
            .map(|record| report::performance_report(&self.performance, &record.summary)))
    }

    /// Headline numbers only
    pub fn get_performance_report_lightweight(&self, session_id: &str) -> Result<Option<Value>> {
        Ok(self
            .store
            .load(session_id)?
            .map(|record| report::performance_report_lightweight(&record.summary)))
    }

    /// Cross-session rotation statistics over the whole store
    pub fn get_rotation_statistics(&self) -> Result<Value> {
        let corpus = self.store.load_all()?;
        Ok(report::rotation_statistics(&self.rotation, &corpus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine() -> (TempDir, CombatTelemetry) {
        let dir = TempDir::new().unwrap();
        let engine = CombatTelemetry::open(dir.path().join("sessions"), TelemetryConfig::default())
            .unwrap();
        (dir, engine)
    }

    #[test]
    fn test_end_session_persists_record() {
        let (_dir, mut engine) = engine();
        let id = engine.start_session(Some("s1".into())).unwrap();
        engine
            .record_ability_use("slash", "goblin", 100.0, "melee", true, 0.0, 25.0)
            .unwrap();
        engine.record_enemy_kill("goblin", 50.0).unwrap();
        let end = engine.end_session().unwrap();

        assert!(end.persistence_error.is_none());
        assert_eq!(end.summary.session_id, id);
        let stored = engine.store().load(&id).unwrap().unwrap();
        assert_eq!(stored.summary, end.summary);
    }

    #[test]
    fn test_record_without_session_fails() {
        let (_dir, mut engine) = engine();
        assert!(matches!(
            engine.record_enemy_kill("goblin", 10.0),
            Err(TelemetryError::NoActiveSession)
        ));
    }

    #[test]
    fn test_session_stats_is_plain_map_when_idle() {
        let (_dir, engine) = engine();
        let stats = engine.session_stats();
        assert!(stats["session_id"].is_null());
        assert_eq!(stats["dps"]["sustained"], 0.0);
    }

    #[test]
    fn test_rotation_statistics_over_store() {
        let (_dir, mut engine) = engine();
        for id in ["a", "b"] {
            engine.start_session(Some(id.into())).unwrap();
            engine
                .record_ability_use("slash", "goblin", 100.0, "melee", true, 0.0, 10.0)
                .unwrap();
            engine.end_session().unwrap();
        }
        let stats = engine.get_rotation_statistics().unwrap();
        assert_eq!(stats["sessions_analyzed"], 2);
    }

    #[test]
    fn test_performance_report_for_unknown_session() {
        let (_dir, engine) = engine();
        assert!(engine.get_performance_report("ghost").unwrap().is_none());
    }
}
