//! Throughput analysis: DPS flavors, trend classification, damage efficiency

pub mod analyzer;
pub mod efficiency;
pub mod trend;

pub use analyzer::ThroughputAnalyzer;
pub use efficiency::{damage_efficiency, AbilityDamageStats, DamageEfficiency};
pub use trend::{analyze_trend, Consistency, DpsTrend, TrendDirection};
