//! Per-ability damage efficiency breakdown

use ahash::AHashMap;
use serde::Serialize;

use crate::event::{CombatEvent, EventLog};

/// Damage statistics for one ability within a session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AbilityDamageStats {
    pub average_damage: f64,
    pub usage_count: u32,
    /// Share of the session's total damage, in [0, 1]
    pub damage_share: f64,
}

/// Session-wide damage efficiency report
#[derive(Clone, Debug, Serialize)]
pub struct DamageEfficiency {
    pub per_ability: AHashMap<String, AbilityDamageStats>,
    pub overall_average: f64,
    /// Inverted coefficient of variation of all damage values:
    /// 1.0 = every hit identical, 0.0 = wildly uneven
    pub consistency: f64,
}

impl DamageEfficiency {
    fn empty() -> Self {
        Self {
            per_ability: AHashMap::new(),
            overall_average: 0.0,
            consistency: 0.0,
        }
    }
}

/// Break down a session's damage by ability
pub fn damage_efficiency(log: &EventLog) -> DamageEfficiency {
    let mut totals: AHashMap<String, (f64, u32)> = AHashMap::new();
    let mut all_damage: Vec<f64> = Vec::new();

    for event in log.events() {
        if let CombatEvent::AbilityUse {
            ability, damage, ..
        } = event
        {
            let entry = totals.entry(ability.clone()).or_insert((0.0, 0));
            entry.0 += damage;
            entry.1 += 1;
            all_damage.push(*damage);
        }
    }

    if all_damage.is_empty() {
        return DamageEfficiency::empty();
    }

    let session_total: f64 = all_damage.iter().sum();
    let per_ability = totals
        .into_iter()
        .map(|(ability, (total, count))| {
            let stats = AbilityDamageStats {
                average_damage: total / count as f64,
                usage_count: count,
                damage_share: if session_total > 0.0 {
                    total / session_total
                } else {
                    0.0
                },
            };
            (ability, stats)
        })
        .collect();

    let mean = session_total / all_damage.len() as f64;
    let consistency = if mean > 0.0 {
        let variance =
            all_damage.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / all_damage.len() as f64;
        (1.0 - variance.sqrt() / mean).max(0.0)
    } else {
        0.0
    };

    DamageEfficiency {
        per_ability,
        overall_average: mean,
        consistency,
    }
}
