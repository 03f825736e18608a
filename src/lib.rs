//! Combat Telemetry & Rotation Optimization Engine
//!
//! Ingests timestamped combat events from a host automation loop,
//! computes live throughput (current/burst/sustained DPS), persists
//! session summaries, and analyzes rotations across sessions.

pub mod core;
pub mod engine;
pub mod event;
pub mod performance;
pub mod report;
pub mod rotation;
pub mod session;
pub mod store;
pub mod throughput;

pub use self::core::{PersistenceError, Result, TelemetryConfig, TelemetryError};
pub use engine::{CombatTelemetry, SessionEnd};
pub use event::{BoundaryKind, CombatEvent, EventLog};
pub use performance::{BenchmarkTier, Grade, PerformanceAnalyzer, PerformanceMetrics};
pub use rotation::{DeadSkill, DeadSkillAction, RotationAnalysis, RotationAnalyzer};
pub use session::{SessionRecord, SessionRecorder, SessionStats, SessionSummary};
pub use store::{AggregateStatistics, ComparisonReport, SessionStore};
pub use throughput::{ThroughputAnalyzer, TrendDirection};
