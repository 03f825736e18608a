//! Single-session performance grading and benchmark comparison
//!
//! The efficiency score here is the same weighted formula rotation
//! analysis ranks with; it lives in exactly one function so the two can
//! never drift apart.

use serde::Serialize;

use crate::core::config::TelemetryConfig;
use crate::session::SessionSummary;

// Efficiency score weights. Throughput dominates, progression matters,
// diversity is a tiebreaker.
const WEIGHT_DPS: f64 = 0.6;
const WEIGHT_XP: f64 = 0.3;
const WEIGHT_DIVERSITY: f64 = 0.1;

/// Letter grade for a session's efficiency score
///
/// | Grade | Score     |
/// |-------|-----------|
/// | S     | >= 0.90   |
/// | A     | >= 0.80   |
/// | B     | >= 0.65   |
/// | C     | >= 0.50   |
/// | D     | >= 0.35   |
/// | F     | otherwise |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.90 => Self::S,
            s if s >= 0.80 => Self::A,
            s if s >= 0.65 => Self::B,
            s if s >= 0.50 => Self::C,
            s if s >= 0.35 => Self::D,
            _ => Self::F,
        }
    }
}

/// Benchmark tiers: fixed DPS / XP-per-hour floors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl BenchmarkTier {
    pub fn floors(self) -> (f64, f64) {
        match self {
            Self::Beginner => (50.0, 1000.0),
            Self::Intermediate => (100.0, 2500.0),
            Self::Advanced => (150.0, 4000.0),
        }
    }
}

/// Derived metrics for one session
#[derive(Clone, Debug, Serialize)]
pub struct PerformanceMetrics {
    pub dps: f64,
    pub xp_per_hour: f64,
    pub efficiency_score: f64,
    pub grade: Grade,
}

/// Per-metric ratios against a benchmark tier's floors
#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkComparison {
    pub tier: BenchmarkTier,
    pub dps_ratio: f64,
    pub xp_ratio: f64,
    pub meets_benchmark: bool,
}

/// Weighted [0, 1] efficiency score
///
/// `0.6 * dps-vs-ceiling + 0.3 * xp-vs-ceiling + 0.1 * diversity-vs-target`,
/// each term saturating at 1.
pub fn efficiency_score(
    config: &TelemetryConfig,
    dps: f64,
    xp_per_hour: f64,
    ability_diversity: usize,
) -> f64 {
    let dps_term = (dps / config.dps_ceiling).min(1.0).max(0.0);
    let xp_term = (xp_per_hour / config.xp_ceiling).min(1.0).max(0.0);
    let diversity_term = (ability_diversity as f64 / config.ability_diversity_target as f64)
        .min(1.0);
    WEIGHT_DPS * dps_term + WEIGHT_XP * xp_term + WEIGHT_DIVERSITY * diversity_term
}

/// Pure function of one session summary to graded metrics
#[derive(Debug, Clone)]
pub struct PerformanceAnalyzer {
    config: TelemetryConfig,
}

impl PerformanceAnalyzer {
    pub fn new(config: TelemetryConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, summary: &SessionSummary) -> PerformanceMetrics {
        let score = efficiency_score(
            &self.config,
            summary.dps,
            summary.xp_per_hour,
            summary.ability_diversity(),
        );
        PerformanceMetrics {
            dps: summary.dps,
            xp_per_hour: summary.xp_per_hour,
            efficiency_score: score,
            grade: Grade::from_score(score),
        }
    }

    pub fn compare_to_benchmark(
        &self,
        metrics: &PerformanceMetrics,
        tier: BenchmarkTier,
    ) -> BenchmarkComparison {
        let (dps_floor, xp_floor) = tier.floors();
        let dps_ratio = metrics.dps / dps_floor;
        let xp_ratio = metrics.xp_per_hour / xp_floor;
        BenchmarkComparison {
            tier,
            dps_ratio,
            xp_ratio,
            meets_benchmark: dps_ratio >= 1.0 && xp_ratio >= 1.0,
        }
    }

    /// Static rule table of tuning suggestions
    pub fn recommendations(&self, summary: &SessionSummary) -> Vec<String> {
        let mut recs = Vec::new();
        if summary.dps < self.config.dps_ceiling * 0.5 {
            recs.push("DPS below half ceiling: upgrade abilities or equipment".to_string());
        }
        if summary.xp_per_hour < self.config.xp_ceiling * 0.25 {
            recs.push("XP rate is low: target higher-value enemies".to_string());
        }
        if summary.ability_diversity() < 3 {
            recs.push("Rotation uses very few abilities: add variety for better uptime".to_string());
        }
        if summary.death_count > 0 && summary.kill_count < summary.death_count * 5 {
            recs.push("High death rate for the kill count: fight easier targets".to_string());
        }
        if recs.is_empty() {
            recs.push("Performance is on target: keep the current rotation".to_string());
        }
        recs
    }
}
