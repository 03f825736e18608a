//! Finalized session aggregates and the persisted wire record
//!
//! Field names on the wire are stable; schema changes must be additive
//! only. Downstream dashboards parse these files directly.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::event::CombatEvent;

/// Immutable aggregate of one completed session
///
/// Created once at session end and never mutated after persistence.
/// Identified uniquely by `session_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(rename = "duration_seconds")]
    pub duration: f64,
    #[serde(rename = "total_damage_dealt")]
    pub total_damage: f64,
    #[serde(rename = "total_xp_gained")]
    pub total_xp: f64,
    #[serde(rename = "kills")]
    pub kill_count: u32,
    #[serde(rename = "deaths")]
    pub death_count: u32,
    #[serde(rename = "abilities_used")]
    pub ability_usage_counts: BTreeMap<String, u32>,
    pub targets_engaged: BTreeSet<String>,
    pub session_state: String,
    pub dps: f64,
    pub xp_per_hour: f64,
    pub damage_per_hour: f64,
}

impl SessionSummary {
    /// Aggregate a finished session's events
    ///
    /// `duration` is clamped at 0 when events arrived out of order and
    /// the end boundary precedes the start.
    pub fn from_events(
        session_id: String,
        start_time: f64,
        end_time: f64,
        events: &[CombatEvent],
    ) -> Self {
        let mut total_damage = 0.0;
        let mut total_xp = 0.0;
        let mut kill_count = 0;
        let mut death_count = 0;
        let mut ability_usage_counts = BTreeMap::new();
        let mut targets_engaged = BTreeSet::new();

        for event in events {
            match event {
                CombatEvent::AbilityUse {
                    ability,
                    target,
                    damage,
                    xp_gained,
                    ..
                } => {
                    total_damage += damage;
                    total_xp += xp_gained;
                    *ability_usage_counts.entry(ability.clone()).or_insert(0) += 1;
                    targets_engaged.insert(target.clone());
                }
                CombatEvent::EnemyKilled { xp_gained, .. } => {
                    kill_count += 1;
                    total_xp += xp_gained;
                }
                CombatEvent::PlayerDeath { .. } => death_count += 1,
                CombatEvent::SessionBoundary { .. } => {}
            }
        }

        let duration = (end_time - start_time).max(0.0);
        let hours = duration.max(1.0) / 3600.0;

        Self {
            session_id,
            start_time,
            end_time,
            duration,
            total_damage,
            total_xp,
            kill_count,
            death_count,
            ability_usage_counts,
            targets_engaged,
            session_state: "completed".into(),
            dps: total_damage / duration.max(1.0),
            xp_per_hour: total_xp / hours,
            damage_per_hour: total_damage / hours,
        }
    }

    /// Number of distinct abilities used
    pub fn ability_diversity(&self) -> usize {
        self.ability_usage_counts.len()
    }

    /// Total ability invocations (all abilities, including failed uses)
    pub fn total_invocations(&self) -> u64 {
        self.ability_usage_counts.values().map(|&c| c as u64).sum()
    }
}

/// The unit of persistence: one summary plus its raw events
///
/// Raw events ride along so rotations can be re-analyzed later without
/// the original session being live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub events: Vec<CombatEvent>,
}
