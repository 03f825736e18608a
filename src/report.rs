//! Wire-format reports
//!
//! Reporting collaborators (CLI, dashboards, chat relays) get plain
//! nested JSON maps, never internal types. The shapes here are the
//! stable output surface; change them additively only.

use serde_json::{json, Value};

use crate::performance::{BenchmarkTier, PerformanceAnalyzer};
use crate::rotation::RotationAnalyzer;
use crate::session::{SessionRecord, SessionStats, SessionSummary};
use crate::throughput::{DamageEfficiency, DpsTrend};

/// Live session snapshot with trend and efficiency detail
pub fn session_stats_report(
    stats: &SessionStats,
    trend: &DpsTrend,
    efficiency: &DamageEfficiency,
) -> Value {
    json!({
        "session_id": stats.session_id,
        "elapsed_seconds": stats.elapsed_seconds,
        "total_damage": stats.total_damage,
        "total_xp": stats.total_xp,
        "kills": stats.kills,
        "deaths": stats.deaths,
        "abilities_used": stats.abilities_used,
        "dps": {
            "current": stats.current_dps,
            "burst": stats.burst_dps,
            "sustained": stats.sustained_dps,
        },
        "trend": trend,
        "damage_efficiency": efficiency,
    })
}

/// Full performance report for one finished session
pub fn performance_report(analyzer: &PerformanceAnalyzer, summary: &SessionSummary) -> Value {
    let metrics = analyzer.analyze(summary);
    let benchmarks: Vec<Value> = [
        BenchmarkTier::Beginner,
        BenchmarkTier::Intermediate,
        BenchmarkTier::Advanced,
    ]
    .into_iter()
    .map(|tier| serde_json::to_value(analyzer.compare_to_benchmark(&metrics, tier)).unwrap_or(Value::Null))
    .collect();

    json!({
        "session_id": summary.session_id,
        "duration_seconds": summary.duration,
        "metrics": metrics,
        "benchmarks": benchmarks,
        "recommendations": analyzer.recommendations(summary),
    })
}

/// Lightweight variant: headline numbers only
pub fn performance_report_lightweight(summary: &SessionSummary) -> Value {
    json!({
        "session_id": summary.session_id,
        "dps": summary.dps,
        "xp_per_hour": summary.xp_per_hour,
        "kills": summary.kill_count,
        "deaths": summary.death_count,
        "duration_seconds": summary.duration,
    })
}

/// Corpus-wide rotation statistics
pub fn rotation_statistics(analyzer: &RotationAnalyzer, corpus: &[SessionRecord]) -> Value {
    let summaries: Vec<_> = corpus.iter().map(|r| r.summary.clone()).collect();
    let dead_skills = analyzer.find_dead_skills(&summaries);
    let top = analyzer.rank_most_efficient(corpus, 3);
    let synergy = analyzer.analyze_ability_synergy(&summaries);

    json!({
        "sessions_analyzed": corpus.len(),
        "unique_abilities": synergy.per_ability_avg_dps.len(),
        "dead_skills": dead_skills.iter().map(|d| json!({
            "skill_name": d.skill_name,
            "usage_count": d.usage_count,
            "usage_percentage": d.usage_percentage,
            "last_used": d.last_used,
            "recommended_action": d.recommended_action.as_str(),
        })).collect::<Vec<_>>(),
        "top_rotations": top.iter().map(|r| json!({
            "rotation_id": r.rotation_id,
            "efficiency_score": r.efficiency_score,
            "dps": r.dps,
        })).collect::<Vec<_>>(),
        "synergy": synergy,
    })
}
