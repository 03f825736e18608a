//! Instantaneous, burst and sustained DPS
//!
//! Pure pull-model computations over the event log. "No data yet" is a
//! normal transient, so every divide-by-zero path returns 0 instead of
//! erroring.

use crate::core::config::TelemetryConfig;
use crate::event::EventLog;

/// Throughput computations over one session's event log
#[derive(Debug, Clone)]
pub struct ThroughputAnalyzer {
    config: TelemetryConfig,
}

impl ThroughputAnalyzer {
    pub fn new(config: TelemetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Damage rate over the trailing current-DPS window ending at `now`
    ///
    /// The divisor is the smaller of the window width and the span since
    /// the first damaging event inside the window, so a fight that just
    /// started is not diluted by empty window time.
    pub fn current_dps(&self, log: &EventLog, now: f64) -> f64 {
        let window = self.config.current_window_secs;
        let cutoff = now - window;

        let mut total = 0.0;
        let mut first_ts = f64::INFINITY;
        for (ts, damage) in log.damage_events_since(cutoff) {
            total += damage;
            if ts < first_ts {
                first_ts = ts;
            }
        }

        if total <= 0.0 {
            return 0.0;
        }

        let span = window.min(now - first_ts);
        if span <= 0.0 {
            return 0.0;
        }
        total / span
    }

    /// Peak damage rate over any trailing burst window in the session
    ///
    /// Sliding-window maximum over the damage events; O(n) per call,
    /// which is fine at session scale (hundreds to low thousands of
    /// events).
    pub fn burst_dps(&self, log: &EventLog) -> f64 {
        let window = self.config.burst_window_secs;
        let mut events: Vec<(f64, f64)> = log.damage_events().collect();
        if events.is_empty() {
            return 0.0;
        }
        // Late-arriving payload events are tolerated by the log, so
        // order by timestamp before scanning
        events.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut best = 0.0f64;
        let mut window_sum = 0.0;
        let mut left = 0;
        for right in 0..events.len() {
            window_sum += events[right].1;
            // Window is inclusive at the left edge: ts >= end - window
            while events[left].0 < events[right].0 - window {
                window_sum -= events[left].1;
                left += 1;
            }
            best = best.max(window_sum);
        }
        best / window
    }

    /// Whole-session damage rate: total damage over elapsed time
    ///
    /// Elapsed time is measured from the session start boundary and
    /// floored at one second so a session's opening hit does not read as
    /// infinite throughput.
    pub fn sustained_dps(&self, log: &EventLog, now: f64) -> f64 {
        let total = log.total_damage();
        if total <= 0.0 {
            return 0.0;
        }
        let start = match log.session_start() {
            Some(ts) => ts,
            None => return 0.0,
        };
        total / (now - start).max(1.0)
    }
}
