//! Cross-session rotation analysis
//!
//! Everything here is derived and recomputed on demand from stored
//! session records; nothing is persisted. The analyzer borrows the
//! corpus read-only and never mutates a summary.

use ahash::AHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::config::TelemetryConfig;
use crate::event::CombatEvent;
use crate::performance::efficiency_score;
use crate::session::{SessionRecord, SessionSummary};
use crate::throughput::AbilityDamageStats;

/// Share below which a flagged skill is "consider removing" rather than
/// merely "review usage"
const NEAR_DEAD_SHARE: f64 = 0.01;

/// What to do about a dead skill
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeadSkillAction {
    RemoveNeverUsed,
    ConsiderRemoving,
    ReviewUsage,
}

// On the wire the action is its human-readable phrase, everywhere it
// appears, so downstream tooling sees one vocabulary.
impl Serialize for DeadSkillAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl DeadSkillAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoveNeverUsed => "remove — never used",
            Self::ConsiderRemoving => "consider removing",
            Self::ReviewUsage => "review usage",
        }
    }
}

/// An ability whose corpus-wide usage share is below the threshold
#[derive(Clone, Debug, Serialize)]
pub struct DeadSkill {
    pub skill_name: String,
    pub usage_count: u64,
    /// Share of all ability invocations across the corpus, in percent
    pub usage_percentage: f64,
    pub last_used: Option<f64>,
    pub recommended_action: DeadSkillAction,
}

/// Derived efficiency view of one session's rotation
#[derive(Clone, Debug, Serialize)]
pub struct RotationAnalysis {
    pub rotation_id: String,
    pub abilities_used: Vec<String>,
    pub dps: f64,
    pub xp_per_hour: f64,
    pub efficiency_score: f64,
    pub ability_efficiency: BTreeMap<String, AbilityDamageStats>,
    pub recommendations: Vec<String>,
}

/// One exact set of abilities and how it performed
#[derive(Clone, Debug, Serialize)]
pub struct AbilityCombination {
    pub abilities: Vec<String>,
    pub frequency: usize,
    pub average_dps: f64,
}

/// Cross-session ability synergy report
#[derive(Clone, Debug, Serialize)]
pub struct SynergyReport {
    /// Combinations sorted by frequency, most used first
    pub most_used_combinations: Vec<AbilityCombination>,
    /// Mean DPS of the sessions each ability appeared in
    pub per_ability_avg_dps: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
}

/// Rotation tuning plan against explicit targets
#[derive(Clone, Debug, Serialize)]
pub struct OptimizationPlan {
    pub current_abilities: Vec<String>,
    pub target_dps: f64,
    pub target_xp_per_hour: f64,
    pub high_performers: Vec<String>,
    pub low_performers: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Scores rotations and flags tuning candidates across a corpus
#[derive(Debug, Clone)]
pub struct RotationAnalyzer {
    config: TelemetryConfig,
}

impl RotationAnalyzer {
    pub fn new(config: TelemetryConfig) -> Self {
        Self { config }
    }

    /// Recompute one session's rotation efficiency from its raw events
    pub fn analyze_session(
        &self,
        summary: &SessionSummary,
        events: &[CombatEvent],
    ) -> RotationAnalysis {
        let mut totals: AHashMap<String, (f64, u32)> = AHashMap::new();
        let mut session_damage = 0.0;
        for event in events {
            if let CombatEvent::AbilityUse {
                ability, damage, ..
            } = event
            {
                let entry = totals.entry(ability.clone()).or_insert((0.0, 0));
                entry.0 += damage;
                entry.1 += 1;
                session_damage += damage;
            }
        }

        let ability_efficiency: BTreeMap<String, AbilityDamageStats> = totals
            .into_iter()
            .map(|(ability, (total, count))| {
                let stats = AbilityDamageStats {
                    average_damage: total / count as f64,
                    usage_count: count,
                    damage_share: if session_damage > 0.0 {
                        total / session_damage
                    } else {
                        0.0
                    },
                };
                (ability, stats)
            })
            .collect();

        let score = efficiency_score(
            &self.config,
            summary.dps,
            summary.xp_per_hour,
            summary.ability_diversity(),
        );

        let recommendations = rotation_recommendations(&ability_efficiency);

        RotationAnalysis {
            rotation_id: format!("rotation_{}", summary.session_id),
            abilities_used: summary.ability_usage_counts.keys().cloned().collect(),
            dps: summary.dps,
            xp_per_hour: summary.xp_per_hour,
            efficiency_score: score,
            ability_efficiency,
            recommendations,
        }
    }

    /// Flag abilities whose corpus-wide usage share is below the
    /// configured threshold, sorted by share ascending
    pub fn find_dead_skills(&self, corpus: &[SessionSummary]) -> Vec<DeadSkill> {
        self.find_dead_skills_with_roster(corpus, &[])
    }

    /// Like `find_dead_skills`, but also checks a known-ability roster.
    /// Roster abilities absent from the corpus come back with zero usage
    /// and a hard removal recommendation.
    pub fn find_dead_skills_with_roster(
        &self,
        corpus: &[SessionSummary],
        roster: &[String],
    ) -> Vec<DeadSkill> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut last_used: BTreeMap<String, f64> = BTreeMap::new();
        for summary in corpus {
            for (ability, &count) in &summary.ability_usage_counts {
                *counts.entry(ability.clone()).or_insert(0) += count as u64;
                let entry = last_used.entry(ability.clone()).or_insert(f64::NEG_INFINITY);
                if summary.end_time > *entry {
                    *entry = summary.end_time;
                }
            }
        }
        for ability in roster {
            counts.entry(ability.clone()).or_insert(0);
        }

        let total: u64 = counts.values().sum();
        if total == 0 && counts.is_empty() {
            return Vec::new();
        }

        let mut dead: Vec<DeadSkill> = counts
            .into_iter()
            .filter_map(|(ability, count)| {
                let share = if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                };
                if share >= self.config.dead_skill_threshold {
                    return None;
                }
                let action = if count == 0 {
                    DeadSkillAction::RemoveNeverUsed
                } else if share < NEAR_DEAD_SHARE {
                    DeadSkillAction::ConsiderRemoving
                } else {
                    DeadSkillAction::ReviewUsage
                };
                Some(DeadSkill {
                    last_used: last_used.get(&ability).copied(),
                    skill_name: ability,
                    usage_count: count,
                    usage_percentage: share * 100.0,
                    recommended_action: action,
                })
            })
            .collect();

        dead.sort_by(|a, b| {
            a.usage_percentage
                .partial_cmp(&b.usage_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        dead
    }

    /// Analyze every session and keep the `limit` highest-scoring rotations
    pub fn rank_most_efficient(
        &self,
        corpus: &[SessionRecord],
        limit: usize,
    ) -> Vec<RotationAnalysis> {
        let mut analyses: Vec<RotationAnalysis> = corpus
            .iter()
            .map(|record| self.analyze_session(&record.summary, &record.events))
            .collect();
        analyses.sort_by(|a, b| {
            b.efficiency_score
                .partial_cmp(&a.efficiency_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        analyses.truncate(limit);
        analyses
    }

    /// Group sessions by the exact set of abilities used and report how
    /// each combination and each ability performed
    pub fn analyze_ability_synergy(&self, corpus: &[SessionSummary]) -> SynergyReport {
        let mut combos: BTreeMap<Vec<String>, (usize, f64)> = BTreeMap::new();
        for summary in corpus {
            // BTreeMap keys are already sorted, so the Vec is a canonical
            // order-independent representation of the set
            let key: Vec<String> = summary.ability_usage_counts.keys().cloned().collect();
            let entry = combos.entry(key).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += summary.dps;
        }

        let mut most_used_combinations: Vec<AbilityCombination> = combos
            .into_iter()
            .map(|(abilities, (frequency, dps_sum))| AbilityCombination {
                abilities,
                frequency,
                average_dps: dps_sum / frequency as f64,
            })
            .collect();
        most_used_combinations.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        let per_ability_avg_dps = per_ability_average_dps(corpus);

        let mut recommendations = Vec::new();
        let best = per_ability_avg_dps
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
        let worst = per_ability_avg_dps
            .iter()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((ability, dps)) = best {
            recommendations.push(format!(
                "Sessions using '{}' average the highest DPS ({:.1}): build rotations around it",
                ability, dps
            ));
        }
        if let (Some((best_name, _)), Some((ability, dps))) = (best, worst) {
            if ability != best_name {
                recommendations.push(format!(
                    "Sessions using '{}' average the lowest DPS ({:.1}): candidate for replacement",
                    ability, dps
                ));
            }
        }

        SynergyReport {
            most_used_combinations,
            per_ability_avg_dps,
            recommendations,
        }
    }

    /// Split the current rotation into high and low performers against an
    /// even per-ability share of the DPS target
    pub fn optimize_rotation(
        &self,
        corpus: &[SessionSummary],
        current_abilities: &[String],
        target_dps: f64,
        target_xp_per_hour: f64,
    ) -> OptimizationPlan {
        let observed = per_ability_average_dps(corpus);
        let per_ability_target = if current_abilities.is_empty() {
            target_dps
        } else {
            target_dps / current_abilities.len() as f64
        };

        let mut high_performers = Vec::new();
        let mut low_performers = Vec::new();
        for ability in current_abilities {
            match observed.get(ability) {
                Some(&avg) if avg >= per_ability_target => high_performers.push(ability.clone()),
                // Unobserved abilities have earned nothing yet
                _ => low_performers.push(ability.clone()),
            }
        }

        let mut recommendations = Vec::new();
        if current_abilities.len() < 5 {
            recommendations
                .push("Rotation is thin: add more abilities for coverage".to_string());
        } else if current_abilities.len() > 10 {
            recommendations
                .push("Rotation is bloated: focus on core abilities".to_string());
        }
        if !low_performers.is_empty() {
            recommendations.push(format!(
                "{} of {} abilities fall short of the per-ability DPS target ({:.1})",
                low_performers.len(),
                current_abilities.len(),
                per_ability_target
            ));
        }
        if !corpus.is_empty() {
            let mean_xp: f64 =
                corpus.iter().map(|s| s.xp_per_hour).sum::<f64>() / corpus.len() as f64;
            if mean_xp < target_xp_per_hour {
                recommendations.push(format!(
                    "Observed XP rate ({:.0}/h) is below the target ({:.0}/h): prioritize XP-rich targets",
                    mean_xp, target_xp_per_hour
                ));
            }
        }

        OptimizationPlan {
            current_abilities: current_abilities.to_vec(),
            target_dps,
            target_xp_per_hour,
            high_performers,
            low_performers,
            recommendations,
        }
    }
}

/// Mean DPS of the sessions each ability appeared in
fn per_ability_average_dps(corpus: &[SessionSummary]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for summary in corpus {
        let abilities: BTreeSet<&String> = summary.ability_usage_counts.keys().collect();
        for ability in abilities {
            let entry = sums.entry(ability.clone()).or_insert((0.0, 0));
            entry.0 += summary.dps;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(ability, (sum, n))| (ability, sum / n as f64))
        .collect()
}

fn rotation_recommendations(
    ability_efficiency: &BTreeMap<String, AbilityDamageStats>,
) -> Vec<String> {
    let mut recs = Vec::new();
    for (ability, stats) in ability_efficiency {
        // Heavily used but contributing little: a filler candidate
        if stats.usage_count >= 5 && stats.damage_share < 0.05 {
            recs.push(format!(
                "'{}' is used often ({} times) but deals {:.1}% of damage: reconsider its place",
                ability,
                stats.usage_count,
                stats.damage_share * 100.0
            ));
        }
    }
    if let Some((ability, stats)) = ability_efficiency
        .iter()
        .max_by(|a, b| {
            a.1.damage_share
                .partial_cmp(&b.1.damage_share)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        if stats.damage_share > 0.0 {
            recs.push(format!(
                "'{}' is the top contributor at {:.1}% of damage: maximize its uptime",
                ability,
                stats.damage_share * 100.0
            ));
        }
    }
    recs
}
