//! Session lifecycle and live recording
//!
//! `SessionRecorder` is the single writer of the event log. The host
//! automation loop owns one recorder and calls it synchronously; the
//! state machine (Idle -> Active -> Idle) enforces that exactly one
//! session is live at a time.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

use crate::core::config::TelemetryConfig;
use crate::core::error::{Result, TelemetryError};
use crate::event::{BoundaryKind, CombatEvent, EventLog};
use crate::session::summary::{SessionRecord, SessionSummary};
use crate::throughput::ThroughputAnalyzer;

#[derive(Clone, Debug)]
enum RecorderState {
    Idle,
    Active { session_id: String, started_at: f64 },
}

/// Real-time view of the recorder, valid in either state
///
/// Zeroed when no session is active; "no data yet" is a normal state,
/// not an error.
#[derive(Clone, Debug, Serialize)]
pub struct SessionStats {
    pub session_id: Option<String>,
    pub elapsed_seconds: f64,
    pub total_damage: f64,
    pub total_xp: f64,
    pub kills: u32,
    pub deaths: u32,
    pub abilities_used: usize,
    pub current_dps: f64,
    pub burst_dps: f64,
    pub sustained_dps: f64,
}

impl SessionStats {
    fn idle() -> Self {
        Self {
            session_id: None,
            elapsed_seconds: 0.0,
            total_damage: 0.0,
            total_xp: 0.0,
            kills: 0,
            deaths: 0,
            abilities_used: 0,
            current_dps: 0.0,
            burst_dps: 0.0,
            sustained_dps: 0.0,
        }
    }
}

/// Records one live session at a time and finalizes it into a record
pub struct SessionRecorder {
    analyzer: ThroughputAnalyzer,
    state: RecorderState,
    log: EventLog,
}

fn wall_clock() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl SessionRecorder {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            analyzer: ThroughputAnalyzer::new(config),
            state: RecorderState::Idle,
            log: EventLog::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RecorderState::Active { .. })
    }

    pub fn active_session_id(&self) -> Option<&str> {
        match &self.state {
            RecorderState::Active { session_id, .. } => Some(session_id),
            RecorderState::Idle => None,
        }
    }

    /// Start a new session, generating an id when none is supplied.
    /// Returns the id in use.
    pub fn start_session(&mut self, session_id: Option<String>) -> Result<String> {
        self.start_session_at(session_id, wall_clock())
    }

    pub fn start_session_at(
        &mut self,
        session_id: Option<String>,
        timestamp: f64,
    ) -> Result<String> {
        if let RecorderState::Active { session_id, .. } = &self.state {
            return Err(TelemetryError::SessionAlreadyActive {
                session_id: session_id.clone(),
            });
        }

        let id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        self.log.clear();
        self.log.record(CombatEvent::SessionBoundary {
            kind: BoundaryKind::Start,
            timestamp,
        })?;
        self.state = RecorderState::Active {
            session_id: id.clone(),
            started_at: timestamp,
        };
        tracing::info!(session_id = %id, "session started");
        Ok(id)
    }

    fn require_active(&self) -> Result<()> {
        match self.state {
            RecorderState::Active { .. } => Ok(()),
            RecorderState::Idle => Err(TelemetryError::NoActiveSession),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log_ability_use(
        &mut self,
        ability: &str,
        target: &str,
        damage: f64,
        damage_type: &str,
        succeeded: bool,
        cooldown_remaining: f64,
        xp_gained: f64,
    ) -> Result<()> {
        self.log_ability_use_at(
            ability,
            target,
            damage,
            damage_type,
            succeeded,
            cooldown_remaining,
            xp_gained,
            wall_clock(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log_ability_use_at(
        &mut self,
        ability: &str,
        target: &str,
        damage: f64,
        damage_type: &str,
        succeeded: bool,
        cooldown_remaining: f64,
        xp_gained: f64,
        timestamp: f64,
    ) -> Result<()> {
        self.require_active()?;
        tracing::debug!(ability, target, damage, "ability use");
        self.log.record(CombatEvent::AbilityUse {
            ability: ability.to_string(),
            target: target.to_string(),
            damage,
            damage_type: damage_type.to_string(),
            succeeded,
            cooldown_remaining,
            xp_gained,
            timestamp,
        })
    }

    pub fn log_enemy_kill(&mut self, enemy_type: &str, xp_gained: f64) -> Result<()> {
        self.log_enemy_kill_at(enemy_type, xp_gained, wall_clock())
    }

    pub fn log_enemy_kill_at(
        &mut self,
        enemy_type: &str,
        xp_gained: f64,
        timestamp: f64,
    ) -> Result<()> {
        self.require_active()?;
        self.log.record(CombatEvent::EnemyKilled {
            enemy_type: enemy_type.to_string(),
            xp_gained,
            timestamp,
        })
    }

    pub fn log_player_death(&mut self) -> Result<()> {
        self.log_player_death_at(wall_clock())
    }

    pub fn log_player_death_at(&mut self, timestamp: f64) -> Result<()> {
        self.require_active()?;
        self.log.record(CombatEvent::PlayerDeath { timestamp })
    }

    /// Finalize the active session into a record and return to Idle
    pub fn end_session(&mut self) -> Result<SessionRecord> {
        self.end_session_at(wall_clock())
    }

    pub fn end_session_at(&mut self, timestamp: f64) -> Result<SessionRecord> {
        let (session_id, started_at) = match &self.state {
            RecorderState::Active {
                session_id,
                started_at,
            } => (session_id.clone(), *started_at),
            RecorderState::Idle => return Err(TelemetryError::NoActiveSession),
        };

        // The end boundary may not precede already-recorded events
        let end_ts = self
            .log
            .events()
            .last()
            .map(|e| timestamp.max(e.timestamp()))
            .unwrap_or(timestamp);
        self.log.record(CombatEvent::SessionBoundary {
            kind: BoundaryKind::End,
            timestamp: end_ts,
        })?;

        let events = self.log.drain();
        let summary = SessionSummary::from_events(session_id, started_at, end_ts, &events);
        self.state = RecorderState::Idle;
        tracing::info!(
            session_id = %summary.session_id,
            duration = summary.duration,
            dps = summary.dps,
            "session ended"
        );
        Ok(SessionRecord { summary, events })
    }

    /// Discard the active session without producing a summary
    pub fn abort_session(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.state, RecorderState::Idle) {
            RecorderState::Active { session_id, .. } => {
                self.log.clear();
                tracing::warn!(session_id = %session_id, "session aborted, events discarded");
                Ok(session_id)
            }
            RecorderState::Idle => Err(TelemetryError::NoActiveSession),
        }
    }

    /// Current DPS; 0.0 when Idle
    pub fn current_dps(&self) -> f64 {
        self.current_dps_at(wall_clock())
    }

    pub fn current_dps_at(&self, now: f64) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        self.analyzer.current_dps(&self.log, now)
    }

    /// Live stats snapshot; zeroed when Idle
    pub fn session_stats(&self) -> SessionStats {
        self.session_stats_at(wall_clock())
    }

    pub fn session_stats_at(&self, now: f64) -> SessionStats {
        let (session_id, started_at) = match &self.state {
            RecorderState::Active {
                session_id,
                started_at,
            } => (session_id.clone(), *started_at),
            RecorderState::Idle => return SessionStats::idle(),
        };

        let mut total_xp = 0.0;
        let mut kills = 0;
        let mut deaths = 0;
        let mut abilities = std::collections::BTreeSet::new();
        for event in self.log.events() {
            match event {
                CombatEvent::AbilityUse {
                    ability, xp_gained, ..
                } => {
                    total_xp += xp_gained;
                    abilities.insert(ability.as_str());
                }
                CombatEvent::EnemyKilled { xp_gained, .. } => {
                    kills += 1;
                    total_xp += xp_gained;
                }
                CombatEvent::PlayerDeath { .. } => deaths += 1,
                CombatEvent::SessionBoundary { .. } => {}
            }
        }

        SessionStats {
            session_id: Some(session_id),
            elapsed_seconds: (now - started_at).max(0.0),
            total_damage: self.log.total_damage(),
            total_xp,
            kills,
            deaths,
            abilities_used: abilities.len(),
            current_dps: self.analyzer.current_dps(&self.log, now),
            burst_dps: self.analyzer.burst_dps(&self.log),
            sustained_dps: self.analyzer.sustained_dps(&self.log, now),
        }
    }

    /// Read access for trend/efficiency analysis while the session is live
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn analyzer(&self) -> &ThroughputAnalyzer {
        &self.analyzer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> SessionRecorder {
        SessionRecorder::new(TelemetryConfig::default())
    }

    #[test]
    fn test_log_before_start_fails() {
        let mut rec = recorder();
        let err = rec
            .log_ability_use_at("slash", "goblin", 10.0, "melee", true, 0.0, 5.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, TelemetryError::NoActiveSession));
        assert!(matches!(
            rec.log_enemy_kill_at("goblin", 50.0, 1.0).unwrap_err(),
            TelemetryError::NoActiveSession
        ));
        assert!(matches!(
            rec.log_player_death_at(1.0).unwrap_err(),
            TelemetryError::NoActiveSession
        ));
    }

    #[test]
    fn test_double_start_fails() {
        let mut rec = recorder();
        rec.start_session_at(Some("s1".into()), 0.0).unwrap();
        let err = rec.start_session_at(Some("s2".into()), 1.0).unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::SessionAlreadyActive { session_id } if session_id == "s1"
        ));
    }

    #[test]
    fn test_generated_id_is_returned() {
        let mut rec = recorder();
        let id = rec.start_session_at(None, 0.0).unwrap();
        assert!(!id.is_empty());
        assert_eq!(rec.active_session_id(), Some(id.as_str()));
    }

    #[test]
    fn test_end_twice_fails_second_time() {
        let mut rec = recorder();
        rec.start_session_at(Some("s1".into()), 0.0).unwrap();
        rec.end_session_at(5.0).unwrap();
        let err = rec.end_session_at(6.0).unwrap_err();
        assert!(matches!(err, TelemetryError::NoActiveSession));
    }

    #[test]
    fn test_full_session_produces_record() {
        let mut rec = recorder();
        rec.start_session_at(Some("s1".into()), 0.0).unwrap();
        for i in 0..5 {
            rec.log_ability_use_at("slash", "goblin", 100.0, "melee", true, 0.0, 10.0, i as f64 + 1.0)
                .unwrap();
        }
        rec.log_enemy_kill_at("goblin", 50.0, 5.0).unwrap();
        let record = rec.end_session_at(5.0).unwrap();

        assert_eq!(record.summary.session_id, "s1");
        assert_eq!(record.summary.total_damage, 500.0);
        assert_eq!(record.summary.kill_count, 1);
        assert_eq!(record.summary.duration, 5.0);
        // start boundary + 5 uses + kill + end boundary
        assert_eq!(record.events.len(), 8);
        assert!(!rec.is_active());
    }

    #[test]
    fn test_end_clamps_to_last_event_timestamp() {
        let mut rec = recorder();
        rec.start_session_at(Some("s1".into()), 10.0).unwrap();
        rec.log_ability_use_at("slash", "goblin", 50.0, "melee", true, 0.0, 0.0, 20.0)
            .unwrap();
        // Caller's clock ran backwards; duration must not go negative
        let record = rec.end_session_at(5.0).unwrap();
        assert_eq!(record.summary.duration, 10.0);
    }

    #[test]
    fn test_stats_zeroed_when_idle() {
        let rec = recorder();
        let stats = rec.session_stats_at(100.0);
        assert!(stats.session_id.is_none());
        assert_eq!(stats.total_damage, 0.0);
        assert_eq!(rec.current_dps_at(100.0), 0.0);
    }

    #[test]
    fn test_stats_reflect_live_session() {
        let mut rec = recorder();
        rec.start_session_at(Some("s1".into()), 0.0).unwrap();
        rec.log_ability_use_at("slash", "goblin", 100.0, "melee", true, 0.0, 25.0, 1.0)
            .unwrap();
        rec.log_player_death_at(2.0).unwrap();
        let stats = rec.session_stats_at(3.0);
        assert_eq!(stats.session_id.as_deref(), Some("s1"));
        assert_eq!(stats.total_damage, 100.0);
        assert_eq!(stats.total_xp, 25.0);
        assert_eq!(stats.deaths, 1);
        assert_eq!(stats.abilities_used, 1);
        assert!(stats.sustained_dps > 0.0);
    }

    #[test]
    fn test_abort_discards_session() {
        let mut rec = recorder();
        rec.start_session_at(Some("s1".into()), 0.0).unwrap();
        rec.log_ability_use_at("slash", "goblin", 100.0, "melee", true, 0.0, 0.0, 1.0)
            .unwrap();
        let id = rec.abort_session().unwrap();
        assert_eq!(id, "s1");
        assert!(!rec.is_active());
        assert!(rec.abort_session().is_err());
    }
}
