//! Combat event stream: the tagged event union and the per-session log

pub mod log;
pub mod types;

pub use log::EventLog;
pub use types::{BoundaryKind, CombatEvent};
