//! Append-only event log for the current session
//!
//! Owned exclusively by the session recorder: cleared on session start,
//! drained into the session record on end. Analysis components only ever
//! read it.

use crate::core::error::{Result, TelemetryError};
use crate::event::types::{BoundaryKind, CombatEvent};

/// Time-ordered store of the active session's events
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<CombatEvent>,
    started: bool,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    ///
    /// Boundary events are validated: a second `Start` while started, any
    /// event before `Start`, and a boundary stamped before the previous
    /// event are all rejected. Payload events are accepted even when
    /// slightly out of order (upstream OCR jitter).
    pub fn record(&mut self, event: CombatEvent) -> Result<()> {
        match &event {
            CombatEvent::SessionBoundary { kind, timestamp } => {
                if *kind == BoundaryKind::Start && self.started {
                    return Err(TelemetryError::InvalidEvent(
                        "session start recorded while already started".into(),
                    ));
                }
                if *kind == BoundaryKind::End && !self.started {
                    return Err(TelemetryError::InvalidEvent(
                        "session end recorded before start".into(),
                    ));
                }
                if let Some(last) = self.events.last() {
                    if *timestamp < last.timestamp() {
                        return Err(TelemetryError::InvalidEvent(format!(
                            "boundary event at {:.3} precedes last event at {:.3}",
                            timestamp,
                            last.timestamp()
                        )));
                    }
                }
                if *kind == BoundaryKind::Start {
                    self.started = true;
                }
            }
            _ => {
                if !self.started {
                    return Err(TelemetryError::InvalidEvent(
                        "event recorded before session start".into(),
                    ));
                }
            }
        }

        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Reset for a new session
    pub fn clear(&mut self) {
        self.events.clear();
        self.started = false;
    }

    /// Move all events out, leaving the log empty and unstarted
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        self.started = false;
        std::mem::take(&mut self.events)
    }

    /// Timestamp of the session start boundary, if recorded
    pub fn session_start(&self) -> Option<f64> {
        self.events.iter().find_map(|e| match e {
            CombatEvent::SessionBoundary {
                kind: BoundaryKind::Start,
                timestamp,
            } => Some(*timestamp),
            _ => None,
        })
    }

    /// Lazy view of `(timestamp, damage)` pairs for damaging events at or
    /// after `cutoff`
    pub fn damage_events_since(&self, cutoff: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.damage_events().filter(move |(ts, _)| *ts >= cutoff)
    }

    /// All damaging events as `(timestamp, damage)` pairs, in log order
    pub fn damage_events(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.events.iter().filter_map(|e| match e {
            CombatEvent::AbilityUse {
                damage, timestamp, ..
            } if *damage > 0.0 => Some((*timestamp, *damage)),
            _ => None,
        })
    }

    pub fn total_damage(&self) -> f64 {
        self.damage_events().map(|(_, d)| d).sum()
    }
}
