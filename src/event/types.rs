//! Combat event types
//!
//! Every observation from the host automation loop becomes one of these
//! variants. The union is closed: consumers match exhaustively, so a new
//! event kind forces every analysis path to handle it.

use serde::{Deserialize, Serialize};

/// Marks the start or end of a recording session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    Start,
    End,
}

/// A single observed combat event
///
/// Timestamps are seconds since the UNIX epoch. Within a session they are
/// non-decreasing for boundary events; payload events may arrive slightly
/// out of order (OCR lag) and are tolerated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    AbilityUse {
        ability: String,
        target: String,
        damage: f64,
        damage_type: String,
        succeeded: bool,
        cooldown_remaining: f64,
        xp_gained: f64,
        timestamp: f64,
    },
    EnemyKilled {
        enemy_type: String,
        xp_gained: f64,
        timestamp: f64,
    },
    PlayerDeath {
        timestamp: f64,
    },
    SessionBoundary {
        kind: BoundaryKind,
        timestamp: f64,
    },
}

impl CombatEvent {
    pub fn timestamp(&self) -> f64 {
        match self {
            Self::AbilityUse { timestamp, .. }
            | Self::EnemyKilled { timestamp, .. }
            | Self::PlayerDeath { timestamp }
            | Self::SessionBoundary { timestamp, .. } => *timestamp,
        }
    }

    /// Damage dealt by this event (0 for non-damage events)
    pub fn damage(&self) -> f64 {
        match self {
            Self::AbilityUse { damage, .. } => *damage,
            _ => 0.0,
        }
    }

    /// XP contributed by this event (0 for non-XP events)
    pub fn xp_gained(&self) -> f64 {
        match self {
            Self::AbilityUse { xp_gained, .. } | Self::EnemyKilled { xp_gained, .. } => *xp_gained,
            _ => 0.0,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::SessionBoundary { .. })
    }
}
